use super::domain::SurveyField;
use super::summary::BucketReport;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    pub country: String,
    pub question_a: String,
    pub question_b: String,
    pub question_c: String,
    pub question_d: String,
    pub question_d_confidence: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerCount {
    pub label: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerDistribution {
    pub field: SurveyField,
    pub field_label: &'static str,
    pub entries: Vec<AnswerCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreFrequency {
    pub score: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassSummary {
    pub assessed: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchTotals {
    pub records: usize,
    pub normalized: usize,
    pub scored: usize,
    pub indicators: usize,
    pub flagged: usize,
    pub rejected: usize,
}

/// Everything a report writer or chart renderer needs from one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentSummary {
    pub totals: BatchTotals,
    pub pass: PassSummary,
    pub tally: Vec<TallyEntry>,
    pub answer_distributions: Vec<AnswerDistribution>,
    pub raw_score_buckets: BucketReport,
    pub final_score_buckets: BucketReport,
    pub raw_score_frequencies: Vec<ScoreFrequency>,
    pub final_score_frequencies: Vec<ScoreFrequency>,
}
