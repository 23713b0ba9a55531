use super::domain::{AssessmentError, RawSurveyRecord, ScoredRecord, SurveyRecord};
use super::indicator::{IndicatorConfig, IndicatorEngine, IndicatorRecord};
use super::normalizer::ResponseNormalizer;
use super::scoring::score_record;
use super::summary::{answer_distributions, pass_summary, score_frequencies, tally, BinScheme};
use super::views::{AssessmentSummary, BatchTotals};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub strict: bool,
    pub indicator: IndicatorConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Normalization,
    Aggregation,
}

/// Whether the record continued through the pipeline after the issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Flagged,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub mpa_id: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub stage: PipelineStage,
    pub disposition: Disposition,
    pub error: AssessmentError,
    pub message: String,
}

impl Diagnostic {
    fn new(
        mpa_id: &str,
        country: &str,
        source: Option<&str>,
        stage: PipelineStage,
        disposition: Disposition,
        error: AssessmentError,
    ) -> Self {
        Self {
            mpa_id: mpa_id.to_string(),
            country: country.to_string(),
            source: source.map(str::to_string),
            stage,
            disposition,
            message: error.to_string(),
            error,
        }
    }
}

/// Output of every stage for one batch of returns.
#[derive(Debug, Clone)]
pub struct AssessmentBatch {
    pub generated_at: DateTime<Utc>,
    pub config: PipelineConfig,
    pub record_count: usize,
    pub normalized: Vec<SurveyRecord>,
    pub scored: Vec<ScoredRecord>,
    pub indicators: Vec<IndicatorRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AssessmentBatch {
    pub fn rejected_records(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.disposition == Disposition::Rejected)
    }

    pub fn flagged_records(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.disposition == Disposition::Flagged)
    }

    pub fn totals(&self) -> BatchTotals {
        BatchTotals {
            records: self.record_count,
            normalized: self.normalized.len(),
            scored: self.scored.len(),
            indicators: self.indicators.len(),
            flagged: self.flagged_records().count(),
            rejected: self.rejected_records().count(),
        }
    }

    pub fn raw_scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.indicators.iter().map(|record| record.raw_score)
    }

    pub fn final_scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.indicators.iter().map(|record| record.final_score)
    }

    /// Summarizes with the standard raw and final score bins.
    pub fn summary(&self) -> AssessmentSummary {
        self.summarize(&BinScheme::raw_score(), &BinScheme::final_score())
    }

    pub fn summarize(&self, raw_bins: &BinScheme, final_bins: &BinScheme) -> AssessmentSummary {
        AssessmentSummary {
            totals: self.totals(),
            pass: pass_summary(&self.indicators),
            tally: tally(&self.normalized),
            answer_distributions: answer_distributions(&self.normalized),
            raw_score_buckets: raw_bins.bucket(self.raw_scores()),
            final_score_buckets: final_bins.bucket(self.final_scores()),
            raw_score_frequencies: score_frequencies(self.raw_scores()),
            final_score_frequencies: score_frequencies(self.final_scores()),
        }
    }
}

/// Runs normalization, score conversion and aggregation over a batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct MepcaPipeline {
    config: PipelineConfig,
    normalizer: ResponseNormalizer,
    engine: IndicatorEngine,
}

impl MepcaPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            normalizer: ResponseNormalizer::new(config.strict),
            engine: IndicatorEngine::new(config.indicator),
        }
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    pub fn run(&self, records: &[RawSurveyRecord]) -> AssessmentBatch {
        let mut diagnostics = Vec::new();

        let normalized = self.normalize(records, &mut diagnostics);
        debug!(records = normalized.len(), "normalized survey records");

        let scored: Vec<ScoredRecord> = normalized.iter().map(score_record).collect();
        debug!(records = scored.len(), "converted survey records to scores");

        let indicators = self.aggregate(&scored, &mut diagnostics);

        let batch = AssessmentBatch {
            generated_at: Utc::now(),
            config: self.config,
            record_count: records.len(),
            normalized,
            scored,
            indicators,
            diagnostics,
        };

        info!(
            records = batch.record_count,
            indicators = batch.indicators.len(),
            flagged = batch.flagged_records().count(),
            rejected = batch.rejected_records().count(),
            "mepca assessment complete"
        );

        batch
    }

    fn normalize(
        &self,
        records: &[RawSurveyRecord],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<SurveyRecord> {
        let mut normalized = Vec::with_capacity(records.len());

        for raw in records {
            match self.normalizer.normalize(raw) {
                Ok(outcome) => {
                    diagnostics.extend(outcome.flags.into_iter().map(|error| {
                        Diagnostic::new(
                            &outcome.record.mpa_id,
                            &outcome.record.country,
                            outcome.record.source.as_deref(),
                            PipelineStage::Normalization,
                            Disposition::Flagged,
                            error,
                        )
                    }));
                    normalized.push(outcome.record);
                }
                Err(error) => {
                    warn!(mpa_id = %raw.mpa_id, %error, "rejected survey record");
                    diagnostics.push(Diagnostic::new(
                        &raw.mpa_id,
                        &raw.country,
                        raw.source.as_deref(),
                        PipelineStage::Normalization,
                        Disposition::Rejected,
                        error,
                    ));
                }
            }
        }

        normalized
    }

    fn aggregate(
        &self,
        scored: &[ScoredRecord],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<IndicatorRecord> {
        let mut indicators = Vec::with_capacity(scored.len());

        for record in scored {
            match self.engine.score(record) {
                Ok(indicator) => indicators.push(indicator),
                Err(error) => {
                    warn!(mpa_id = %record.mpa_id, %error, "indicator not computed");
                    diagnostics.push(Diagnostic::new(
                        &record.mpa_id,
                        &record.country,
                        record.source.as_deref(),
                        PipelineStage::Aggregation,
                        Disposition::Rejected,
                        error,
                    ));
                }
            }
        }

        indicators
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::mepca::domain::SurveyField;

    fn complete(id: &str, a: &str, b: &str, c: &str, d: &str, confidence: &str) -> RawSurveyRecord {
        RawSurveyRecord::new(id, "Portugal")
            .with_cell(SurveyField::QuestionA, a)
            .with_cell(SurveyField::QuestionB, b)
            .with_cell(SurveyField::QuestionC, c)
            .with_cell(SurveyField::QuestionD, d)
            .with_cell(SurveyField::QuestionDConfidence, confidence)
    }

    #[test]
    fn missing_cells_reject_only_the_affected_record() {
        let mut gap = complete("gap", "yes", "yes", "yes", "yes", "high");
        gap.question_b_response = None;
        let records = vec![complete("ok", "yes", "yes", "yes", "yes", "high"), gap];

        let batch = MepcaPipeline::default().run(&records);

        assert_eq!(batch.normalized.len(), 2);
        assert_eq!(batch.scored.len(), 2);
        assert_eq!(batch.indicators.len(), 1);
        let rejected: Vec<&Diagnostic> = batch.rejected_records().collect();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].mpa_id, "gap");
        assert_eq!(rejected[0].stage, PipelineStage::Aggregation);
        assert_eq!(
            rejected[0].error,
            AssessmentError::MissingScoreInput {
                field: SurveyField::QuestionB
            }
        );
    }

    #[test]
    fn unrecognized_cells_are_flagged_then_rejected_at_aggregation() {
        let records = vec![complete("odd", "yes", "maybe", "no", "no", "low")];

        let batch = MepcaPipeline::default().run(&records);

        assert!(batch.indicators.is_empty());
        let totals = batch.totals();
        assert_eq!(totals.flagged, 1);
        assert_eq!(totals.rejected, 1);
    }

    #[test]
    fn strict_mode_stops_records_before_scoring() {
        let config = PipelineConfig {
            strict: true,
            ..PipelineConfig::default()
        };
        let records = vec![
            complete("odd", "yes", "maybe", "no", "no", "low"),
            complete("ok", "partial", "no", "no", "no", "low"),
        ];

        let batch = MepcaPipeline::new(config).run(&records);

        assert_eq!(batch.normalized.len(), 1);
        assert_eq!(batch.indicators.len(), 1);
        let rejected: Vec<&Diagnostic> = batch.rejected_records().collect();
        assert_eq!(rejected[0].stage, PipelineStage::Normalization);
    }

    #[test]
    fn summary_uses_standard_bins() {
        let records = vec![
            complete("top", "yes", "yes", "yes", "yes", "high"),
            complete("none", "no", "no", "no", "no", "not applicable"),
        ];

        let summary = MepcaPipeline::default().run(&records).summary();

        assert_eq!(summary.raw_score_buckets.counts, vec![1, 0, 0, 0, 1]);
        assert_eq!(summary.final_score_buckets.counts, vec![1, 0, 0, 1]);
        assert_eq!(summary.pass.passed, 1);
        assert_eq!(summary.totals.indicators, 2);
    }
}
