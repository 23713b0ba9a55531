//! MEPCA indicator scoring for OSPAR MPA management returns.
//!
//! Records move forward through normalization, rubric scoring, indicator
//! aggregation and summarization; every stage returns a new record set.

pub mod domain;
pub mod indicator;
pub mod normalizer;
mod pipeline;
pub mod scoring;
pub mod summary;
pub mod views;

pub use domain::{
    Answer, AssessmentError, CanonicalValue, Confidence, RawSurveyRecord, Response, ScoredRecord,
    SurveyField, SurveyRecord,
};
pub use indicator::{
    IndicatorBreakdown, IndicatorConfig, IndicatorEngine, IndicatorInputs, IndicatorRecord,
    PASS_THRESHOLD,
};
pub use normalizer::ResponseNormalizer;
pub use pipeline::{
    AssessmentBatch, Diagnostic, Disposition, MepcaPipeline, PipelineConfig, PipelineStage,
};
pub use scoring::{Rubric, MISSING_SCORE_SENTINEL};
pub use summary::{BinScheme, BucketReport, SummaryError};
pub use views::AssessmentSummary;
