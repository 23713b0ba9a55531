use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical answer to one of the four management status questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Yes,
    Partial,
    No,
    NoResponse,
    Unknown,
    NotApplicable,
}

impl Response {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Yes,
            Self::Partial,
            Self::No,
            Self::NoResponse,
            Self::Unknown,
            Self::NotApplicable,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::Partial => "Partial",
            Self::No => "No",
            Self::NoResponse => "No response",
            Self::Unknown => "Unknown",
            Self::NotApplicable => "Not Applicable",
        }
    }

    pub const fn colour(self) -> &'static str {
        match self {
            Self::Yes => "#00b050",
            Self::Partial => "#f79646",
            Self::No => "#c0504d",
            Self::NoResponse => "#404040",
            Self::Unknown | Self::NotApplicable => "#a6a6a6",
        }
    }
}

/// Canonical confidence attached to question D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Moderate,
    Low,
    NotApplicable,
}

impl Confidence {
    pub const fn ordered() -> [Self; 4] {
        [Self::High, Self::Moderate, Self::Low, Self::NotApplicable]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
            Self::NotApplicable => "Not Applicable",
        }
    }

    pub const fn colour(self) -> &'static str {
        match self {
            Self::High => "#00b050",
            Self::Moderate => "#f79646",
            Self::Low => "#c0504d",
            Self::NotApplicable => "#a6a6a6",
        }
    }
}

/// Shared surface of the two canonical vocabularies.
pub trait CanonicalValue: Copy + Eq + fmt::Debug + 'static {
    fn label(self) -> &'static str;
    fn colour(self) -> &'static str;
    fn variants() -> &'static [Self];
}

impl CanonicalValue for Response {
    fn label(self) -> &'static str {
        Response::label(self)
    }

    fn colour(self) -> &'static str {
        Response::colour(self)
    }

    fn variants() -> &'static [Self] {
        const VARIANTS: [Response; 6] = Response::ordered();
        &VARIANTS
    }
}

impl CanonicalValue for Confidence {
    fn label(self) -> &'static str {
        Confidence::label(self)
    }

    fn colour(self) -> &'static str {
        Confidence::colour(self)
    }

    fn variants() -> &'static [Self] {
        const VARIANTS: [Confidence; 4] = Confidence::ordered();
        &VARIANTS
    }
}

/// The five scored columns of a management return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyField {
    QuestionA,
    QuestionB,
    QuestionC,
    QuestionD,
    QuestionDConfidence,
}

impl SurveyField {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::QuestionA,
            Self::QuestionB,
            Self::QuestionC,
            Self::QuestionD,
            Self::QuestionDConfidence,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::QuestionA => "a) Management documented",
            Self::QuestionB => "b) Measures implemented",
            Self::QuestionC => "c) Monitoring in place",
            Self::QuestionD => "d) Moving towards objectives",
            Self::QuestionDConfidence => "d) Moving towards objectives - Confidence",
        }
    }

    pub const fn is_confidence(self) -> bool {
        matches!(self, Self::QuestionDConfidence)
    }
}

impl fmt::Display for SurveyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalized cell: a canonical value, nothing, or text kept verbatim for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer<T> {
    Known(T),
    Missing,
    Unrecognized(String),
}

impl<T: CanonicalValue> Answer<T> {
    pub fn known(&self) -> Option<T> {
        match self {
            Answer::Known(value) => Some(*value),
            _ => None,
        }
    }

    /// Label written to reports; unrecognized text passes through unchanged.
    pub fn label(&self) -> &str {
        match self {
            Answer::Known(value) => value.label(),
            Answer::Missing => "",
            Answer::Unrecognized(raw) => raw,
        }
    }
}

/// One row of a management return as it arrives from the source sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSurveyRecord {
    pub mpa_id: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub question_a_response: Option<String>,
    pub question_b_response: Option<String>,
    pub question_c_response: Option<String>,
    pub question_d_response: Option<String>,
    pub question_d_confidence: Option<String>,
}

impl RawSurveyRecord {
    pub fn new(mpa_id: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            mpa_id: mpa_id.into(),
            country: country.into(),
            ..Self::default()
        }
    }

    pub fn with_cell(mut self, field: SurveyField, value: impl Into<String>) -> Self {
        *self.cell_mut(field) = Some(value.into());
        self
    }

    pub fn cell(&self, field: SurveyField) -> Option<&str> {
        match field {
            SurveyField::QuestionA => self.question_a_response.as_deref(),
            SurveyField::QuestionB => self.question_b_response.as_deref(),
            SurveyField::QuestionC => self.question_c_response.as_deref(),
            SurveyField::QuestionD => self.question_d_response.as_deref(),
            SurveyField::QuestionDConfidence => self.question_d_confidence.as_deref(),
        }
    }

    pub(crate) fn cell_mut(&mut self, field: SurveyField) -> &mut Option<String> {
        match field {
            SurveyField::QuestionA => &mut self.question_a_response,
            SurveyField::QuestionB => &mut self.question_b_response,
            SurveyField::QuestionC => &mut self.question_c_response,
            SurveyField::QuestionD => &mut self.question_d_response,
            SurveyField::QuestionDConfidence => &mut self.question_d_confidence,
        }
    }
}

/// A management return after normalization into the canonical vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub mpa_id: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub question_a: Answer<Response>,
    pub question_b: Answer<Response>,
    pub question_c: Answer<Response>,
    pub question_d: Answer<Response>,
    pub question_d_confidence: Answer<Confidence>,
}

impl SurveyRecord {
    pub fn response(&self, field: SurveyField) -> Option<&Answer<Response>> {
        match field {
            SurveyField::QuestionA => Some(&self.question_a),
            SurveyField::QuestionB => Some(&self.question_b),
            SurveyField::QuestionC => Some(&self.question_c),
            SurveyField::QuestionD => Some(&self.question_d),
            SurveyField::QuestionDConfidence => None,
        }
    }

    pub fn label(&self, field: SurveyField) -> &str {
        match self.response(field) {
            Some(answer) => answer.label(),
            None => self.question_d_confidence.label(),
        }
    }
}

/// A management return with every cell converted to its rubric score.
///
/// `None` marks a cell that was missing or outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub mpa_id: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub question_a: Option<u8>,
    pub question_b: Option<u8>,
    pub question_c: Option<u8>,
    pub question_d: Option<u8>,
    pub question_d_confidence: Option<u8>,
}

impl ScoredRecord {
    pub fn score(&self, field: SurveyField) -> Option<u8> {
        match field {
            SurveyField::QuestionA => self.question_a,
            SurveyField::QuestionB => self.question_b,
            SurveyField::QuestionC => self.question_c,
            SurveyField::QuestionD => self.question_d,
            SurveyField::QuestionDConfidence => self.question_d_confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssessmentError {
    #[error("unrecognized value '{value}' in {field}")]
    UnrecognizedResponseValue { field: SurveyField, value: String },
    #[error("missing score input for {field}")]
    MissingScoreInput { field: SurveyField },
}

impl AssessmentError {
    pub fn field(&self) -> SurveyField {
        match self {
            AssessmentError::UnrecognizedResponseValue { field, .. }
            | AssessmentError::MissingScoreInput { field } => *field,
        }
    }
}
