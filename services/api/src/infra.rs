use mepca::config::AssessmentConfig;
use mepca::workflows::mepca::{BinScheme, IndicatorConfig, PipelineConfig, SummaryError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) assessment: AssessmentConfig,
}

/// Per-run switches layered over the configured assessment defaults.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AssessmentOverrides {
    pub(crate) strict: Option<bool>,
    pub(crate) zero_confidence_exclusion: Option<bool>,
}

impl AssessmentOverrides {
    pub(crate) fn apply(self, defaults: AssessmentConfig) -> PipelineConfig {
        PipelineConfig {
            strict: self.strict.unwrap_or(defaults.strict),
            indicator: IndicatorConfig {
                zero_confidence_exclusion: self
                    .zero_confidence_exclusion
                    .unwrap_or(defaults.zero_confidence_exclusion),
            },
        }
    }
}

/// Falls back to the standard raw and final bins when no edges are given.
pub(crate) fn bin_schemes(
    raw_edges: Option<Vec<f64>>,
    final_edges: Option<Vec<f64>>,
) -> Result<(BinScheme, BinScheme), SummaryError> {
    let raw = match raw_edges {
        Some(edges) => BinScheme::from_edges(edges)?,
        None => BinScheme::raw_score(),
    };
    let fin = match final_edges {
        Some(edges) => BinScheme::from_edges(edges)?,
        None => BinScheme::final_score(),
    };
    Ok((raw, fin))
}

/// Comma separated bin edges given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BinEdges(pub(crate) Vec<f64>);

pub(crate) fn parse_bin_edges(raw: &str) -> Result<BinEdges, String> {
    raw.split(',')
        .map(|edge| {
            edge.trim()
                .parse::<f64>()
                .map_err(|err| format!("failed to parse '{edge}' as a bin edge ({err})"))
        })
        .collect::<Result<Vec<f64>, String>>()
        .map(BinEdges)
}
