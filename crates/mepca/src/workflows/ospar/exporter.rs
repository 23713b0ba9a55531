use crate::workflows::mepca::scoring::export_score;
use crate::workflows::mepca::views::TallyEntry;
use crate::workflows::mepca::{
    AssessmentBatch, AssessmentSummary, BucketReport, IndicatorRecord, ScoredRecord, SurveyRecord,
};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const QC_FILE: &str = "2-Addendum3_Management_MEPCA-qc.csv";
pub const SCORE_CONVERSION_FILE: &str = "2-Addendum3_Management_MEPCA-scoreconv.csv";
pub const COUNT_MATRIX_FILE: &str = "5-Addendum3_Management_MEPCA-countmatrix.csv";
pub const FINAL_SCORE_FILE: &str = "2-Addendum3_Management_MEPCA-FinalScore.csv";
pub const DISTRIBUTION_FILE: &str = "MEPCA-distribution.csv";

// Header rows for tables with no records; `serialize` only emits them alongside a first row.
const RECORD_HEADERS: &[&str] = &[
    "MPA ID",
    "Country",
    "a) Management documented: Response",
    "b)Measures implemented: Response",
    "c) Monitoring in place: Response",
    "d)Moving towards objectives - Response",
    "d)Moving towards objectives - Confidence score",
];
const COUNT_HEADERS: &[&str] = &[
    "Country",
    "a) Management documented: Response",
    "b)Measures implemented: Response",
    "c) Monitoring in place: Response",
    "d)Moving towards objectives - Response",
    "d)Moving towards objectives - Confidence score",
    "size",
];
const FINAL_SCORE_HEADERS: &[&str] = &[
    "MPA ID",
    "Country",
    "a) Management documented: Response",
    "b)Measures implemented: Response",
    "c) Monitoring in place: Response",
    "d)Moving towards objectives - Response",
    "d)Moving towards objectives - Confidence score",
    "PartOne",
    "PartTwo",
    "PartThree",
    "PartFour",
    "PartFive",
    "PartSix",
    "PartSeven",
    "IndicatorScore",
    "IndicatorScoreFin",
    "Pass",
];
const DISTRIBUTION_HEADERS: &[&str] = &["scheme", "bucket", "lower", "upper", "count"];

#[derive(Debug, thiserror::Error)]
pub enum OsparExportError {
    #[error("failed to prepare output directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

#[derive(Serialize)]
struct QcRow<'a> {
    #[serde(rename = "MPA ID")]
    mpa_id: &'a str,
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "a) Management documented: Response")]
    question_a: &'a str,
    #[serde(rename = "b)Measures implemented: Response")]
    question_b: &'a str,
    #[serde(rename = "c) Monitoring in place: Response")]
    question_c: &'a str,
    #[serde(rename = "d)Moving towards objectives - Response")]
    question_d: &'a str,
    #[serde(rename = "d)Moving towards objectives - Confidence score")]
    question_d_confidence: &'a str,
}

#[derive(Serialize)]
struct ScoreRow<'a> {
    #[serde(rename = "MPA ID")]
    mpa_id: &'a str,
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "a) Management documented: Response")]
    question_a: u16,
    #[serde(rename = "b)Measures implemented: Response")]
    question_b: u16,
    #[serde(rename = "c) Monitoring in place: Response")]
    question_c: u16,
    #[serde(rename = "d)Moving towards objectives - Response")]
    question_d: u16,
    #[serde(rename = "d)Moving towards objectives - Confidence score")]
    question_d_confidence: u16,
}

#[derive(Serialize)]
struct CountRow<'a> {
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "a) Management documented: Response")]
    question_a: &'a str,
    #[serde(rename = "b)Measures implemented: Response")]
    question_b: &'a str,
    #[serde(rename = "c) Monitoring in place: Response")]
    question_c: &'a str,
    #[serde(rename = "d)Moving towards objectives - Response")]
    question_d: &'a str,
    #[serde(rename = "d)Moving towards objectives - Confidence score")]
    question_d_confidence: &'a str,
    size: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct FinalScoreRow<'a> {
    #[serde(rename = "MPA ID")]
    mpa_id: &'a str,
    country: &'a str,
    #[serde(rename = "a) Management documented: Response")]
    question_a: u8,
    #[serde(rename = "b)Measures implemented: Response")]
    question_b: u8,
    #[serde(rename = "c) Monitoring in place: Response")]
    question_c: u8,
    #[serde(rename = "d)Moving towards objectives - Response")]
    question_d: u8,
    #[serde(rename = "d)Moving towards objectives - Confidence score")]
    question_d_confidence: u8,
    part_one: f64,
    part_two: f64,
    part_three: f64,
    part_four: f64,
    part_five: f64,
    part_six: f64,
    part_seven: f64,
    indicator_score: f64,
    indicator_score_fin: f64,
    pass: bool,
}

#[derive(Serialize)]
struct DistributionRow<'a> {
    scheme: &'a str,
    bucket: &'a str,
    lower: f64,
    upper: f64,
    count: usize,
}

/// Normalized labels; unrecognized text passes through unchanged.
pub fn write_normalized<W: Write>(writer: W, records: &[SurveyRecord]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(QcRow {
            mpa_id: &record.mpa_id,
            country: &record.country,
            question_a: record.question_a.label(),
            question_b: record.question_b.label(),
            question_c: record.question_c.label(),
            question_d: record.question_d.label(),
            question_d_confidence: record.question_d_confidence.label(),
        })?;
    }
    if records.is_empty() {
        csv_writer.write_record(RECORD_HEADERS)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Rubric scores with the missing-value sentinel in place of gaps.
pub fn write_scores<W: Write>(writer: W, records: &[ScoredRecord]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(ScoreRow {
            mpa_id: &record.mpa_id,
            country: &record.country,
            question_a: export_score(record.question_a),
            question_b: export_score(record.question_b),
            question_c: export_score(record.question_c),
            question_d: export_score(record.question_d),
            question_d_confidence: export_score(record.question_d_confidence),
        })?;
    }
    if records.is_empty() {
        csv_writer.write_record(RECORD_HEADERS)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_tally<W: Write>(writer: W, entries: &[TallyEntry]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(CountRow {
            country: &entry.country,
            question_a: &entry.question_a,
            question_b: &entry.question_b,
            question_c: &entry.question_c,
            question_d: &entry.question_d,
            question_d_confidence: &entry.question_d_confidence,
            size: entry.count,
        })?;
    }
    if entries.is_empty() {
        csv_writer.write_record(COUNT_HEADERS)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_indicators<W: Write>(
    writer: W,
    records: &[IndicatorRecord],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        let breakdown = &record.breakdown;
        csv_writer.serialize(FinalScoreRow {
            mpa_id: &record.mpa_id,
            country: &record.country,
            question_a: record.inputs.question_a,
            question_b: record.inputs.question_b,
            question_c: record.inputs.question_c,
            question_d: record.inputs.question_d,
            question_d_confidence: record.inputs.question_d_confidence,
            part_one: breakdown.part_one,
            part_two: breakdown.part_two,
            part_three: breakdown.part_three,
            part_four: breakdown.part_four,
            part_five: breakdown.part_five,
            part_six: breakdown.part_six,
            part_seven: breakdown.part_seven,
            indicator_score: record.raw_score,
            indicator_score_fin: record.final_score,
            pass: record.pass_flag,
        })?;
    }
    if records.is_empty() {
        csv_writer.write_record(FINAL_SCORE_HEADERS)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_distribution<W: Write>(
    writer: W,
    reports: &[(&str, &BucketReport)],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for &(scheme, report) in reports {
        for (index, (bucket, count)) in report.entries().enumerate() {
            csv_writer.serialize(DistributionRow {
                scheme,
                bucket,
                lower: report.edges[index],
                upper: report.edges[index + 1],
                count,
            })?;
        }
    }
    if reports.iter().all(|(_, report)| report.counts.is_empty()) {
        csv_writer.write_record(DISTRIBUTION_HEADERS)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the result tables of one assessment batch into a directory.
#[derive(Debug, Clone)]
pub struct OsparExporter {
    output_dir: PathBuf,
}

impl OsparExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn export(
        &self,
        batch: &AssessmentBatch,
        summary: &AssessmentSummary,
    ) -> Result<Vec<PathBuf>, OsparExportError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| OsparExportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let written = vec![
            self.write_file(QC_FILE, |file| write_normalized(file, &batch.normalized))?,
            self.write_file(SCORE_CONVERSION_FILE, |file| {
                write_scores(file, &batch.scored)
            })?,
            self.write_file(COUNT_MATRIX_FILE, |file| write_tally(file, &summary.tally))?,
            self.write_file(FINAL_SCORE_FILE, |file| {
                write_indicators(file, &batch.indicators)
            })?,
            self.write_file(DISTRIBUTION_FILE, |file| {
                write_distribution(
                    file,
                    &[
                        ("raw_score", &summary.raw_score_buckets),
                        ("final_score", &summary.final_score_buckets),
                    ],
                )
            })?,
        ];

        info!(dir = %self.output_dir.display(), files = written.len(), "wrote MEPCA outputs");
        Ok(written)
    }

    fn write_file<F>(&self, name: &str, write: F) -> Result<PathBuf, OsparExportError>
    where
        F: FnOnce(std::fs::File) -> Result<(), csv::Error>,
    {
        let path = self.output_dir.join(name);
        let file = std::fs::File::create(&path).map_err(|source| OsparExportError::Io {
            path: path.clone(),
            source,
        })?;
        write(file).map_err(|source| OsparExportError::Csv {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
