use super::domain::{Answer, CanonicalValue, Confidence, Response, SurveyField, SurveyRecord};
use super::indicator::IndicatorRecord;
use super::views::{AnswerCount, AnswerDistribution, PassSummary, ScoreFrequency, TallyEntry};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SummaryError {
    #[error("invalid bin edges {edges:?}: {reason}")]
    InvalidBinEdges {
        edges: Vec<f64>,
        reason: &'static str,
    },
    #[error("bin scheme has {intervals} intervals but {labels} labels")]
    BinLabelMismatch { intervals: usize, labels: usize },
}

/// Counts returns per (country, answers, confidence) combination.
pub fn tally(records: &[SurveyRecord]) -> Vec<TallyEntry> {
    let mut counts: BTreeMap<[&str; 6], usize> = BTreeMap::new();

    for record in records {
        let key = [
            record.country.as_str(),
            record.question_a.label(),
            record.question_b.label(),
            record.question_c.label(),
            record.question_d.label(),
            record.question_d_confidence.label(),
        ];
        *counts.entry(key).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|([country, a, b, c, d, confidence], count)| TallyEntry {
            country: country.to_string(),
            question_a: a.to_string(),
            question_b: b.to_string(),
            question_c: c.to_string(),
            question_d: d.to_string(),
            question_d_confidence: confidence.to_string(),
            count,
        })
        .collect()
}

/// Per-question answer counts in vocabulary order, then unrecognized text, then gaps.
pub fn answer_distributions(records: &[SurveyRecord]) -> Vec<AnswerDistribution> {
    SurveyField::ordered()
        .into_iter()
        .map(|field| {
            let entries = if field.is_confidence() {
                count_answers::<Confidence>(
                    records.iter().map(|record| &record.question_d_confidence),
                )
            } else {
                count_answers::<Response>(
                    records.iter().filter_map(|record| record.response(field)),
                )
            };

            AnswerDistribution {
                field,
                field_label: field.label(),
                entries,
            }
        })
        .collect()
}

fn count_answers<'a, T>(answers: impl Iterator<Item = &'a Answer<T>>) -> Vec<AnswerCount>
where
    T: CanonicalValue + 'a,
{
    let mut known = vec![0usize; T::variants().len()];
    let mut unrecognized: BTreeMap<&str, usize> = BTreeMap::new();
    let mut missing = 0usize;

    for answer in answers {
        match answer {
            Answer::Known(value) => {
                if let Some(index) = T::variants().iter().position(|variant| variant == value) {
                    known[index] += 1;
                }
            }
            Answer::Unrecognized(raw) => *unrecognized.entry(raw.as_str()).or_default() += 1,
            Answer::Missing => missing += 1,
        }
    }

    let mut entries: Vec<AnswerCount> = T::variants()
        .iter()
        .zip(known)
        .filter(|(_, count)| *count > 0)
        .map(|(value, count)| AnswerCount {
            label: value.label().to_string(),
            count,
            colour: Some(value.colour()),
        })
        .collect();

    entries.extend(unrecognized.into_iter().map(|(label, count)| AnswerCount {
        label: label.to_string(),
        count,
        colour: None,
    }));

    if missing > 0 {
        entries.push(AnswerCount {
            label: "Missing".to_string(),
            count: missing,
            colour: None,
        });
    }

    entries
}

/// Distinct score values with their counts, ascending.
pub fn score_frequencies(values: impl IntoIterator<Item = f64>) -> Vec<ScoreFrequency> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|value| !value.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);

    let mut frequencies: Vec<ScoreFrequency> = Vec::new();
    for value in sorted {
        match frequencies.last_mut() {
            Some(last) if last.score.total_cmp(&value) == Ordering::Equal => last.count += 1,
            _ => frequencies.push(ScoreFrequency {
                score: value,
                count: 1,
            }),
        }
    }
    frequencies
}

pub fn pass_summary(indicators: &[IndicatorRecord]) -> PassSummary {
    let assessed = indicators.len();
    let passed = indicators.iter().filter(|record| record.pass_flag).count();
    let pass_rate = if assessed == 0 {
        0.0
    } else {
        passed as f64 / assessed as f64
    };

    PassSummary {
        assessed,
        passed,
        failed: assessed - passed,
        pass_rate,
    }
}

/// Ordered bin edges with one label per interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinScheme {
    edges: Vec<f64>,
    labels: Vec<String>,
}

impl BinScheme {
    pub fn new(edges: Vec<f64>, labels: Vec<String>) -> Result<Self, SummaryError> {
        validate_edges(&edges)?;
        let intervals = edges.len() - 1;
        if labels.len() != intervals {
            return Err(SummaryError::BinLabelMismatch {
                intervals,
                labels: labels.len(),
            });
        }
        Ok(Self { edges, labels })
    }

    /// Labels each interval as `low-high`.
    pub fn from_edges(edges: Vec<f64>) -> Result<Self, SummaryError> {
        validate_edges(&edges)?;
        let labels = edges
            .windows(2)
            .map(|pair| format!("{}-{}", format_edge(pair[0]), format_edge(pair[1])))
            .collect();
        Ok(Self { edges, labels })
    }

    /// Quintiles used for raw indicator scores.
    pub fn raw_score() -> Self {
        Self::fixed(
            &[0.0, 20.0, 40.0, 60.0, 80.0, 100.0],
            &["0-20", "20-40", "40-60", "60-80", "80-100"],
        )
    }

    /// Threshold-aligned bins used for final indicator scores.
    pub fn final_score() -> Self {
        Self::fixed(
            &[0.0, 38.24, 60.0, 80.0, 100.0],
            &["0-38.24", "38.25-60", "60-80", "80-100"],
        )
    }

    fn fixed(edges: &[f64], labels: &[&str]) -> Self {
        Self {
            edges: edges.to_vec(),
            labels: labels.iter().map(|label| label.to_string()).collect(),
        }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Counts values into `[edge[i], edge[i+1])`, closing the last interval.
    pub fn bucket(&self, values: impl IntoIterator<Item = f64>) -> BucketReport {
        let intervals = self.edges.len() - 1;
        let lower = self.edges[0];
        let upper = self.edges[intervals];
        let mut counts = vec![0usize; intervals];
        let mut out_of_range = 0usize;

        for value in values {
            if value.is_nan() || value < lower || value > upper {
                out_of_range += 1;
                continue;
            }
            let index = (self.edges.partition_point(|edge| *edge <= value) - 1).min(intervals - 1);
            counts[index] += 1;
        }

        BucketReport {
            edges: self.edges.clone(),
            labels: self.labels.clone(),
            counts,
            out_of_range,
        }
    }
}

fn validate_edges(edges: &[f64]) -> Result<(), SummaryError> {
    let reason = if edges.len() < 2 {
        Some("at least two edges are required")
    } else if edges.iter().any(|edge| !edge.is_finite()) {
        Some("edges must be finite")
    } else if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
        Some("edges must be strictly increasing")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SummaryError::InvalidBinEdges {
            edges: edges.to_vec(),
            reason,
        }),
        None => Ok(()),
    }
}

fn format_edge(edge: f64) -> String {
    if edge.fract() == 0.0 {
        format!("{edge:.0}")
    } else {
        edge.to_string()
    }
}

/// Bucket counts in parallel with their labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketReport {
    pub edges: Vec<f64>,
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
    pub out_of_range: usize,
}

impl BucketReport {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }
}

/// Buckets values against caller-supplied edges.
pub fn bucket_scores(values: &[f64], edges: &[f64]) -> Result<BucketReport, SummaryError> {
    let scheme = BinScheme::from_edges(edges.to_vec())?;
    Ok(scheme.bucket(values.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, a: Response, confidence: Answer<Confidence>) -> SurveyRecord {
        SurveyRecord {
            mpa_id: format!("{country}-{a:?}"),
            country: country.to_string(),
            source: None,
            question_a: Answer::Known(a),
            question_b: Answer::Known(Response::Yes),
            question_c: Answer::Known(Response::No),
            question_d: Answer::Known(Response::Partial),
            question_d_confidence: confidence,
        }
    }

    #[test]
    fn tally_groups_identical_combinations() {
        let records = vec![
            record("Spain", Response::Yes, Answer::Known(Confidence::High)),
            record("Spain", Response::Yes, Answer::Known(Confidence::High)),
            record("Spain", Response::No, Answer::Known(Confidence::High)),
            record("Belgium", Response::Yes, Answer::Missing),
        ];

        let entries = tally(&records);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].country, "Belgium");
        assert_eq!(entries[0].question_d_confidence, "");
        let spain_yes = entries
            .iter()
            .find(|entry| entry.country == "Spain" && entry.question_a == "Yes")
            .expect("spain entry");
        assert_eq!(spain_yes.count, 2);
        assert_eq!(entries.iter().map(|entry| entry.count).sum::<usize>(), 4);
    }

    #[test]
    fn distributions_follow_vocabulary_order() {
        let records = vec![
            record("Spain", Response::No, Answer::Known(Confidence::Low)),
            record("Spain", Response::Yes, Answer::Unrecognized("n/a".into())),
            record("Spain", Response::Yes, Answer::Missing),
        ];

        let distributions = answer_distributions(&records);
        assert_eq!(distributions.len(), 5);

        let question_a = &distributions[0];
        assert_eq!(question_a.field, SurveyField::QuestionA);
        let labels: Vec<&str> = question_a.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Yes", "No"]);
        assert_eq!(question_a.entries[0].count, 2);
        assert_eq!(question_a.entries[0].colour, Some("#00b050"));

        let confidence = &distributions[4];
        let labels: Vec<&str> = confidence.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Low", "n/a", "Missing"]);
    }

    #[test]
    fn raw_scheme_closes_the_last_interval() {
        let report = BinScheme::raw_score().bucket([0.0, 19.99, 20.0, 38.2, 79.9, 80.0, 100.0]);
        assert_eq!(report.counts, vec![2, 2, 0, 1, 2]);
        assert_eq!(report.out_of_range, 0);
        assert_eq!(report.labels[4], "80-100");
    }

    #[test]
    fn final_scheme_splits_at_the_pass_threshold() {
        let report = BinScheme::final_score().bucket([0.0, 38.235, 38.24, 59.0, 100.0]);
        assert_eq!(report.counts, vec![2, 2, 0, 1]);
        assert_eq!(report.labels[1], "38.25-60");
    }

    #[test]
    fn bucketing_partitions_in_range_values() {
        let values = [3.0, 97.0, 41.2, 41.2, 0.0, 66.6, 20.0, 100.0, -1.0, f64::NAN, 140.0];
        let report = bucket_scores(&values, &[0.0, 25.0, 50.0, 75.0, 100.0]).expect("valid");
        assert_eq!(report.total() + report.out_of_range, values.len());
        assert_eq!(report.total(), 8);
        assert_eq!(report.out_of_range, 3);
        assert_eq!(report.labels, vec!["0-25", "25-50", "50-75", "75-100"]);
    }

    #[test]
    fn non_increasing_edges_are_rejected() {
        assert!(matches!(
            bucket_scores(&[1.0], &[0.0, 50.0, 50.0]),
            Err(SummaryError::InvalidBinEdges { .. })
        ));
        assert!(matches!(
            bucket_scores(&[1.0], &[10.0]),
            Err(SummaryError::InvalidBinEdges { .. })
        ));
        assert!(matches!(
            bucket_scores(&[1.0], &[0.0, f64::INFINITY]),
            Err(SummaryError::InvalidBinEdges { .. })
        ));
        assert_eq!(
            BinScheme::new(vec![0.0, 1.0], vec![]),
            Err(SummaryError::BinLabelMismatch {
                intervals: 1,
                labels: 0
            })
        );
    }

    #[test]
    fn fractional_edges_keep_their_precision_in_labels() {
        let scheme = BinScheme::from_edges(vec![0.0, 38.24, 100.0]).expect("valid");
        assert_eq!(scheme.labels(), ["0-38.24", "38.24-100"]);
    }

    #[test]
    fn frequencies_collapse_equal_scores() {
        let frequencies = score_frequencies([50.0, 0.0, 50.0, 100.0, f64::NAN]);
        let pairs: Vec<(f64, usize)> = frequencies.iter().map(|f| (f.score, f.count)).collect();
        assert_eq!(pairs, vec![(0.0, 1), (50.0, 2), (100.0, 1)]);
    }
}
