use super::domain::{Answer, CanonicalValue, Confidence, Response, ScoredRecord, SurveyRecord};

/// Value written in place of a missing score by the score conversion export.
pub const MISSING_SCORE_SENTINEL: u16 = 9999;

/// Maps a canonical value onto its MEPCA rubric score.
pub trait Rubric: CanonicalValue {
    fn score(self) -> u8;
}

impl Rubric for Response {
    fn score(self) -> u8 {
        match self {
            Response::Yes => 2,
            Response::Partial => 1,
            Response::No | Response::NoResponse | Response::Unknown | Response::NotApplicable => 0,
        }
    }
}

impl Rubric for Confidence {
    fn score(self) -> u8 {
        match self {
            Confidence::High => 3,
            Confidence::Moderate => 2,
            Confidence::Low => 1,
            Confidence::NotApplicable => 0,
        }
    }
}

pub fn score_answer<T: Rubric>(answer: &Answer<T>) -> Option<u8> {
    answer.known().map(Rubric::score)
}

pub fn score_record(record: &SurveyRecord) -> ScoredRecord {
    ScoredRecord {
        mpa_id: record.mpa_id.clone(),
        country: record.country.clone(),
        source: record.source.clone(),
        question_a: score_answer(&record.question_a),
        question_b: score_answer(&record.question_b),
        question_c: score_answer(&record.question_c),
        question_d: score_answer(&record.question_d),
        question_d_confidence: score_answer(&record.question_d_confidence),
    }
}

/// Score as exported to the conversion sheet, with the sentinel for gaps.
pub fn export_score(score: Option<u8>) -> u16 {
    score.map(u16::from).unwrap_or(MISSING_SCORE_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_rubric_is_total() {
        let scores: Vec<u8> = Response::ordered().into_iter().map(Rubric::score).collect();
        assert_eq!(scores, vec![2, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn confidence_rubric_is_total() {
        let scores: Vec<u8> = Confidence::ordered()
            .into_iter()
            .map(Rubric::score)
            .collect();
        assert_eq!(scores, vec![3, 2, 1, 0]);
    }

    #[test]
    fn canonical_answers_never_score_as_missing() {
        for response in Response::ordered() {
            assert!(score_answer(&Answer::Known(response)).is_some());
        }
        for confidence in Confidence::ordered() {
            assert!(score_answer(&Answer::Known(confidence)).is_some());
        }
    }

    #[test]
    fn gaps_score_as_missing_and_export_as_sentinel() {
        let missing: Answer<Response> = Answer::Missing;
        let odd: Answer<Confidence> = Answer::Unrecognized("Very high".to_string());

        assert_eq!(score_answer(&missing), None);
        assert_eq!(score_answer(&odd), None);
        assert_eq!(export_score(None), 9999);
        assert_eq!(export_score(Some(2)), 2);
    }
}
