use crate::infra::{bin_schemes, AppState, AssessmentOverrides};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use mepca::error::AppError;
use mepca::workflows::mepca::{
    AssessmentSummary, Diagnostic, IndicatorRecord, MepcaPipeline, PipelineConfig,
};
use mepca::workflows::ospar::OsparReturnImporter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;

const ASSESSMENT_SOURCE: &str = "request";

#[derive(Debug, Deserialize)]
pub(crate) struct AssessmentRequest {
    pub(crate) csv: String,
    #[serde(default)]
    pub(crate) strict: Option<bool>,
    #[serde(default)]
    pub(crate) zero_confidence_exclusion: Option<bool>,
    #[serde(default)]
    pub(crate) include_records: bool,
    #[serde(default)]
    pub(crate) raw_bins: Option<Vec<f64>>,
    #[serde(default)]
    pub(crate) final_bins: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssessmentResponse {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) config: PipelineConfig,
    pub(crate) summary: AssessmentSummary,
    pub(crate) diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) records: Option<Vec<IndicatorRecord>>,
}

pub(crate) fn assessment_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/mepca/assessment",
            axum::routing::post(assessment_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn assessment_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<AssessmentRequest>,
) -> Result<Json<AssessmentResponse>, AppError> {
    let AssessmentRequest {
        csv,
        strict,
        zero_confidence_exclusion,
        include_records,
        raw_bins,
        final_bins,
    } = payload;

    let config = AssessmentOverrides {
        strict,
        zero_confidence_exclusion,
    }
    .apply(state.assessment);
    let (raw_bins, final_bins) = bin_schemes(raw_bins, final_bins)?;

    let reader = Cursor::new(csv.into_bytes());
    let records = OsparReturnImporter::from_reader(reader, ASSESSMENT_SOURCE)?;
    let batch = MepcaPipeline::new(config).run(&records);
    let summary = batch.summarize(&raw_bins, &final_bins);

    Ok(Json(AssessmentResponse {
        generated_at: batch.generated_at,
        config: batch.config,
        summary,
        diagnostics: batch.diagnostics,
        records: include_records.then_some(batch.indicators),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use mepca::config::AssessmentConfig;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    const RETURNS: &str = "Country,MPA ID,a) Management documented: Response,b)Measures implemented: Response,c) Monitoring in place: Response,d)Moving towards objectives - Response,d)Moving towards objectives - Confidence score\n\
Ireland,IE-1,Yes,Yes,Yes,Yes,High\n\
Ireland,IE-2,Yes,Yes,Yes,No,Low\n\
Ireland,IE-3,Yes,Partial,Yes,Yes,Not applicable\n\
Ireland,IE-4,Yes,sometimes,Yes,Yes,High\n";

    fn state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            assessment: AssessmentConfig {
                strict: false,
                zero_confidence_exclusion: true,
            },
        }
    }

    fn request(csv: &str) -> AssessmentRequest {
        AssessmentRequest {
            csv: csv.to_string(),
            strict: None,
            zero_confidence_exclusion: None,
            include_records: false,
            raw_bins: None,
            final_bins: None,
        }
    }

    #[tokio::test]
    async fn assessment_endpoint_returns_summary() {
        let Json(body) = assessment_endpoint(Extension(state(true)), Json(request(RETURNS)))
            .await
            .expect("assessment runs");

        assert_eq!(body.config, PipelineConfig::default());
        assert_eq!(body.summary.totals.records, 4);
        assert_eq!(body.summary.totals.indicators, 3);
        assert_eq!(body.summary.pass.passed, 1);
        assert_eq!(body.summary.final_score_buckets.counts, vec![2, 0, 0, 1]);
        assert!(body.records.is_none());

        let rejected: Vec<&str> = body
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.mpa_id.as_str())
            .collect();
        assert_eq!(rejected, vec!["IE-4", "IE-4"]);
    }

    #[tokio::test]
    async fn assessment_endpoint_applies_request_overrides() {
        let mut payload = request(RETURNS);
        payload.strict = Some(true);
        payload.zero_confidence_exclusion = Some(false);
        payload.include_records = true;

        let Json(body) = assessment_endpoint(Extension(state(true)), Json(payload))
            .await
            .expect("assessment runs");

        assert!(body.config.strict);
        assert_eq!(body.summary.totals.normalized, 3);
        let records = body.records.expect("records returned");
        let unconfident = records
            .iter()
            .find(|record| record.mpa_id == "IE-3")
            .expect("IE-3 scored");
        assert_eq!(unconfident.final_score, unconfident.raw_score);
    }

    #[tokio::test]
    async fn assessment_endpoint_rejects_returns_without_survey_columns() {
        let error = assessment_endpoint(
            Extension(state(true)),
            Json(request("Country,MPA ID\nIreland,IE-1\n")),
        )
        .await
        .expect_err("missing columns");

        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn assessment_route_rejects_invalid_bins() {
        let router = assessment_routes().layer(Extension(state(true)));
        let body = json!({ "csv": RETURNS, "raw_bins": [0.0, 60.0, 40.0] });

        let response = router
            .oneshot(
                Request::post("/api/v1/mepca/assessment")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        let payload: Value = serde_json::from_slice(&bytes).expect("json body");
        assert!(payload["error"]
            .as_str()
            .expect("error message")
            .contains("strictly increasing"));
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let response = readiness_endpoint(Extension(state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(Extension(state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
