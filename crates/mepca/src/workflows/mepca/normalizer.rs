use super::domain::{
    Answer, AssessmentError, Confidence, RawSurveyRecord, Response, SurveyField, SurveyRecord,
};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

/// Every term of the controlled vocabulary, across both rubrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    Yes,
    Partial,
    No,
    NoResponse,
    Unknown,
    NotApplicable,
    High,
    Moderate,
    Low,
}

impl Term {
    pub fn parse(value: &str) -> Option<Self> {
        vocabulary().get(&fold(value)).copied()
    }

    pub const fn as_response(self) -> Option<Response> {
        match self {
            Term::Yes => Some(Response::Yes),
            Term::Partial => Some(Response::Partial),
            Term::No => Some(Response::No),
            Term::NoResponse => Some(Response::NoResponse),
            Term::Unknown => Some(Response::Unknown),
            Term::NotApplicable => Some(Response::NotApplicable),
            Term::High | Term::Moderate | Term::Low => None,
        }
    }

    pub const fn as_confidence(self) -> Option<Confidence> {
        match self {
            Term::High => Some(Confidence::High),
            Term::Moderate => Some(Confidence::Moderate),
            Term::Low => Some(Confidence::Low),
            Term::NotApplicable => Some(Confidence::NotApplicable),
            _ => None,
        }
    }
}

static VOCABULARY: OnceLock<HashMap<String, Term>> = OnceLock::new();

fn vocabulary() -> &'static HashMap<String, Term> {
    VOCABULARY.get_or_init(|| {
        const RAW_TO_TERM: &[(&str, Term)] = &[
            // Variants seen in country returns
            ("yes", Term::Yes),
            ("partial", Term::Partial),
            ("no", Term::No),
            ("no response", Term::NoResponse),
            ("unknown", Term::Unknown),
            ("Not applicable", Term::NotApplicable),
            ("high", Term::High),
            ("moderate", Term::Moderate),
            ("low", Term::Low),
            // Canonical labels
            ("Yes", Term::Yes),
            ("Partial", Term::Partial),
            ("No", Term::No),
            ("No response", Term::NoResponse),
            ("Unknown", Term::Unknown),
            ("Not Applicable", Term::NotApplicable),
            ("High", Term::High),
            ("Moderate", Term::Moderate),
            ("Low", Term::Low),
        ];

        let mut map = HashMap::with_capacity(RAW_TO_TERM.len());
        for (raw, term) in RAW_TO_TERM {
            map.insert(fold(raw), *term);
        }
        map
    })
}

/// Strips invisible characters and collapses whitespace, keeping case.
pub(crate) fn clean_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold(value: &str) -> String {
    clean_text(value).to_ascii_lowercase()
}

/// Unrecognized cells keep their text exactly as it arrived.
fn normalize_cell<T>(raw: Option<&str>, narrow: impl Fn(Term) -> Option<T>) -> Answer<T> {
    let Some(raw) = raw.filter(|value| !clean_text(value).is_empty()) else {
        return Answer::Missing;
    };

    match Term::parse(raw).and_then(narrow) {
        Some(value) => Answer::Known(value),
        None => Answer::Unrecognized(raw.to_string()),
    }
}

pub fn normalize_response(raw: Option<&str>) -> Answer<Response> {
    normalize_cell(raw, Term::as_response)
}

pub fn normalize_confidence(raw: Option<&str>) -> Answer<Confidence> {
    normalize_cell(raw, Term::as_confidence)
}

/// A normalized record and the cells that fell outside the vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub record: SurveyRecord,
    pub flags: Vec<AssessmentError>,
}

/// Applies the vocabulary to every scored column of a return.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer {
    strict: bool,
}

impl ResponseNormalizer {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// In strict mode the first unrecognized cell rejects the record.
    pub fn normalize(&self, raw: &RawSurveyRecord) -> Result<Normalized, AssessmentError> {
        let record = SurveyRecord {
            mpa_id: raw.mpa_id.clone(),
            country: clean_text(&raw.country),
            source: raw.source.clone(),
            question_a: normalize_response(raw.cell(SurveyField::QuestionA)),
            question_b: normalize_response(raw.cell(SurveyField::QuestionB)),
            question_c: normalize_response(raw.cell(SurveyField::QuestionC)),
            question_d: normalize_response(raw.cell(SurveyField::QuestionD)),
            question_d_confidence: normalize_confidence(raw.cell(SurveyField::QuestionDConfidence)),
        };

        let mut flags = Vec::new();
        for field in SurveyField::ordered() {
            let unrecognized = match record.response(field) {
                Some(Answer::Unrecognized(value)) => Some(value),
                Some(_) => None,
                None => match &record.question_d_confidence {
                    Answer::Unrecognized(value) => Some(value),
                    _ => None,
                },
            };

            if let Some(value) = unrecognized {
                warn!(mpa_id = %record.mpa_id, %field, %value, "unrecognized survey response");
                let flag = AssessmentError::UnrecognizedResponseValue {
                    field,
                    value: value.clone(),
                };
                if self.strict {
                    return Err(flag);
                }
                flags.push(flag);
            }
        }

        Ok(Normalized { record, flags })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_variants_collapse_to_canonical_labels() {
        assert_eq!(normalize_response(Some("yes")), Answer::Known(Response::Yes));
        assert_eq!(
            normalize_response(Some("no response")),
            Answer::Known(Response::NoResponse)
        );
        assert_eq!(
            normalize_response(Some("Not applicable")),
            Answer::Known(Response::NotApplicable)
        );
        assert_eq!(
            normalize_confidence(Some("moderate")),
            Answer::Known(Confidence::Moderate)
        );
        assert_eq!(
            normalize_confidence(Some("LOW")),
            Answer::Known(Confidence::Low)
        );
    }

    #[test]
    fn whitespace_and_invisible_characters_are_ignored() {
        assert_eq!(
            normalize_response(Some("\u{feff}  No   response ")),
            Answer::Known(Response::NoResponse)
        );
    }

    #[test]
    fn blank_cells_are_missing() {
        assert_eq!(normalize_response(None), Answer::Missing);
        assert_eq!(normalize_response(Some("   ")), Answer::Missing);
        assert_eq!(normalize_confidence(Some("")), Answer::Missing);
    }

    #[test]
    fn terms_from_the_other_rubric_are_unrecognized() {
        assert_eq!(
            normalize_response(Some("High")),
            Answer::Unrecognized("High".to_string())
        );
        assert_eq!(
            normalize_confidence(Some("Partial")),
            Answer::Unrecognized("Partial".to_string())
        );
    }

    #[test]
    fn normalizing_a_canonical_label_is_identity() {
        for response in Response::ordered() {
            let once = normalize_response(Some(response.label()));
            let twice = normalize_response(Some(once.label()));
            assert_eq!(once, Answer::Known(response));
            assert_eq!(once, twice);
        }
        for confidence in Confidence::ordered() {
            let once = normalize_confidence(Some(confidence.label()));
            assert_eq!(normalize_confidence(Some(once.label())), once);
        }

        let odd = normalize_response(Some("Maybe  later"));
        assert_eq!(normalize_response(Some(odd.label())), odd);
    }

    #[test]
    fn unrecognized_text_is_kept_as_written() {
        assert_eq!(
            normalize_response(Some("Maybe  later")),
            Answer::Unrecognized("Maybe  later".to_string())
        );
        assert_eq!(
            normalize_confidence(Some("  very\u{200b} high ")),
            Answer::Unrecognized("  very\u{200b} high ".to_string())
        );
    }

    #[test]
    fn lenient_normalizer_flags_unrecognized_cells() {
        let raw = RawSurveyRecord::new("MPA-1", "Norway")
            .with_cell(SurveyField::QuestionA, "yes")
            .with_cell(SurveyField::QuestionB, "sometimes")
            .with_cell(SurveyField::QuestionC, "no")
            .with_cell(SurveyField::QuestionD, "partial")
            .with_cell(SurveyField::QuestionDConfidence, "very high");

        let normalized = ResponseNormalizer::new(false)
            .normalize(&raw)
            .expect("lenient mode keeps the record");

        assert_eq!(normalized.record.question_a, Answer::Known(Response::Yes));
        assert_eq!(
            normalized.record.question_b,
            Answer::Unrecognized("sometimes".to_string())
        );
        assert_eq!(normalized.flags.len(), 2);
        assert_eq!(normalized.flags[1].field(), SurveyField::QuestionDConfidence);
    }

    #[test]
    fn strict_normalizer_rejects_unrecognized_cells() {
        let raw = RawSurveyRecord::new("MPA-2", "France")
            .with_cell(SurveyField::QuestionA, "yes")
            .with_cell(SurveyField::QuestionC, "n/a");

        let error = ResponseNormalizer::new(true)
            .normalize(&raw)
            .expect_err("strict mode rejects");

        assert_eq!(
            error,
            AssessmentError::UnrecognizedResponseValue {
                field: SurveyField::QuestionC,
                value: "n/a".to_string(),
            }
        );
    }
}
