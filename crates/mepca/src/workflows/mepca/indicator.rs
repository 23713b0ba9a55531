use super::domain::{AssessmentError, ScoredRecord, SurveyField};
use serde::{Deserialize, Serialize};

pub const WEIGHT_MANAGEMENT_DOCUMENTED: f64 = 0.15;
pub const WEIGHT_MEASURES_IMPLEMENTED: f64 = 0.25;
pub const WEIGHT_MONITORING_IN_PLACE: f64 = 0.25;
pub const WEIGHT_MOVING_TOWARDS_OBJECTIVES: f64 = 0.35;

/// Maximum weighted sum: 2 * (0.15 + 0.25 + 0.25) + (2 * 3) * 0.35.
pub const WEIGHTED_SUM_CEILING: f64 = 3.4;

/// Minimum indicator score, in percent, for adequate management.
pub const PASS_THRESHOLD: f64 = 38.24;

pub fn passes(raw_score: f64) -> bool {
    raw_score >= PASS_THRESHOLD
}

/// Controls how the final score treats assessments without confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub zero_confidence_exclusion: bool,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            zero_confidence_exclusion: true,
        }
    }
}

/// Rubric scores feeding one indicator calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorInputs {
    pub question_a: u8,
    pub question_b: u8,
    pub question_c: u8,
    pub question_d: u8,
    pub question_d_confidence: u8,
}

impl IndicatorInputs {
    /// Fails on the first missing score, in column order.
    pub fn from_scored(record: &ScoredRecord) -> Result<Self, AssessmentError> {
        let require = |field: SurveyField| {
            record
                .score(field)
                .ok_or(AssessmentError::MissingScoreInput { field })
        };

        Ok(Self {
            question_a: require(SurveyField::QuestionA)?,
            question_b: require(SurveyField::QuestionB)?,
            question_c: require(SurveyField::QuestionC)?,
            question_d: require(SurveyField::QuestionD)?,
            question_d_confidence: require(SurveyField::QuestionDConfidence)?,
        })
    }
}

/// Intermediate terms of the indicator formula, kept for audit exports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBreakdown {
    pub part_one: f64,
    pub part_two: f64,
    pub part_three: f64,
    pub part_four: f64,
    pub part_five: f64,
    pub part_six: f64,
    pub part_seven: f64,
}

impl IndicatorBreakdown {
    pub fn compute(inputs: &IndicatorInputs) -> Self {
        let part_one = f64::from(inputs.question_a) * WEIGHT_MANAGEMENT_DOCUMENTED;
        let part_two = f64::from(inputs.question_b) * WEIGHT_MEASURES_IMPLEMENTED;
        let part_three = f64::from(inputs.question_c) * WEIGHT_MONITORING_IN_PLACE;
        let part_four = f64::from(inputs.question_d) * f64::from(inputs.question_d_confidence);
        let part_five = part_four * WEIGHT_MOVING_TOWARDS_OBJECTIVES;
        let part_six = part_one + part_two + part_three + part_five;
        let part_seven = part_six / WEIGHTED_SUM_CEILING;

        Self {
            part_one,
            part_two,
            part_three,
            part_four,
            part_five,
            part_six,
            part_seven,
        }
    }

    pub fn raw_score(&self) -> f64 {
        self.part_seven * 100.0
    }
}

/// Composite MEPCA indicator for one MPA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub mpa_id: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub inputs: IndicatorInputs,
    pub breakdown: IndicatorBreakdown,
    pub raw_score: f64,
    pub final_score: f64,
    pub pass_flag: bool,
}

/// Stateless calculator applying the indicator formula to scored records.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> IndicatorConfig {
        self.config
    }

    pub fn score(&self, record: &ScoredRecord) -> Result<IndicatorRecord, AssessmentError> {
        let inputs = IndicatorInputs::from_scored(record)?;
        let breakdown = IndicatorBreakdown::compute(&inputs);
        let raw_score = breakdown.raw_score();
        let final_score = self.final_score(raw_score, inputs.question_d_confidence);

        Ok(IndicatorRecord {
            mpa_id: record.mpa_id.clone(),
            country: record.country.clone(),
            source: record.source.clone(),
            inputs,
            breakdown,
            raw_score,
            final_score,
            pass_flag: passes(raw_score),
        })
    }

    fn final_score(&self, raw_score: f64, confidence: u8) -> f64 {
        if self.config.zero_confidence_exclusion && confidence == 0 {
            0.0
        } else {
            raw_score
        }
    }
}
