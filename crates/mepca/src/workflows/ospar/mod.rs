mod exporter;
mod mapping;
mod normalizer;
mod parser;

pub use exporter::{
    write_distribution, write_indicators, write_normalized, write_scores, write_tally,
    OsparExportError, OsparExporter,
};

use crate::workflows::mepca::RawSurveyRecord;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sheet of the OSPAR management reporting workbook holding the returns.
pub const MANAGEMENT_SHEET: &str = "MPA_MGT";

#[derive(Debug)]
pub enum OsparImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn { file: String, column: &'static str },
    NoInputFiles(PathBuf),
}

impl std::fmt::Display for OsparImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsparImportError::Io(err) => write!(f, "failed to read OSPAR return: {}", err),
            OsparImportError::Csv(err) => write!(f, "invalid OSPAR CSV data: {}", err),
            OsparImportError::MissingColumn { file, column } => {
                write!(
                    f,
                    "{} is missing the '{}' column of the {} sheet",
                    file, column, MANAGEMENT_SHEET
                )
            }
            OsparImportError::NoInputFiles(dir) => {
                write!(f, "no CSV returns found in {}", dir.display())
            }
        }
    }
}

impl std::error::Error for OsparImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OsparImportError::Io(err) => Some(err),
            OsparImportError::Csv(err) => Some(err),
            OsparImportError::MissingColumn { .. } | OsparImportError::NoInputFiles(_) => None,
        }
    }
}

impl From<std::io::Error> for OsparImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for OsparImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads CSV exports of the `MPA_MGT` sheet into raw survey records.
pub struct OsparReturnImporter;

impl OsparReturnImporter {
    /// Accepts either a single CSV file or a directory of them.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<RawSurveyRecord>, OsparImportError> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::from_dir(path)
        } else {
            Self::from_path(path)
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawSurveyRecord>, OsparImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let records = Self::from_reader(file, &name)?;
        info!(file = %name, records = records.len(), "imported OSPAR return");
        Ok(records)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        source: &str,
    ) -> Result<Vec<RawSurveyRecord>, OsparImportError> {
        parser::parse_records(reader, source)
    }

    /// Merges the records of every CSV file in `dir`, in file name order.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<RawSurveyRecord>, OsparImportError> {
        let dir = dir.as_ref();
        let files = Self::discover(dir)?;
        if files.is_empty() {
            return Err(OsparImportError::NoInputFiles(dir.to_path_buf()));
        }

        let mut records = Vec::new();
        for file in &files {
            records.extend(Self::from_path(file)?);
        }

        info!(
            files = files.len(),
            records = records.len(),
            dir = %dir.display(),
            "merged OSPAR returns"
        );
        Ok(records)
    }

    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, OsparImportError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if path.is_file() && is_csv {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::mepca::SurveyField;
    use mapping::Column;
    use std::io::Cursor;

    const HEADER: &str = "Country,MPA ID,a) Management documented: Response,b)Measures implemented: Response ,c) Monitoring in place: Response,d)Moving towards objectives - Response,d)Moving towards objectives - Confidence score";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mepca-ospar-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn normalize_header_removes_whitespace_and_case() {
        let normalized =
            normalizer::normalize_for_tests("\u{feff}b)Measures  implemented: Response ");
        assert_eq!(normalized, "b)measures implemented: response");
    }

    #[test]
    fn mapping_recognizes_ospar_headers() {
        assert_eq!(mapping::lookup_for_tests("Country"), Some(Column::Country));
        assert_eq!(
            mapping::lookup_for_tests("b)Measures implemented: Response "),
            Some(Column::Survey(SurveyField::QuestionB))
        );
        assert_eq!(
            mapping::lookup_for_tests("d) Moving towards objectives - Confidence score"),
            Some(Column::Survey(SurveyField::QuestionDConfidence))
        );
        assert_eq!(mapping::lookup_for_tests("Comments"), None);
    }

    #[test]
    fn parser_keeps_blank_cells_as_missing() {
        let csv = format!("{HEADER}\nUK,UK-001,yes,,Partial,no,high\n");
        let records = OsparReturnImporter::from_reader(Cursor::new(csv), "uk.csv").expect("parse");

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.mpa_id, "UK-001");
        assert_eq!(record.source.as_deref(), Some("uk.csv"));
        assert_eq!(record.cell(SurveyField::QuestionA), Some("yes"));
        assert_eq!(record.cell(SurveyField::QuestionB), None);
        assert_eq!(record.cell(SurveyField::QuestionDConfidence), Some("high"));
    }

    #[test]
    fn parser_derives_ids_when_column_absent() {
        let csv = "Country,a) Management documented: Response,b)Measures implemented: Response,c) Monitoring in place: Response,d)Moving towards objectives - Response,d)Moving towards objectives - Confidence score,Notes\n\
Sweden,Yes,Yes,No,No,Low,first\n\
,,,,,,\n\
Sweden,No,No,No,No,Not applicable,third\n";
        let records =
            OsparReturnImporter::from_reader(Cursor::new(csv), "se.csv").expect("parse");

        let ids: Vec<&str> = records.iter().map(|record| record.mpa_id.as_str()).collect();
        assert_eq!(ids, vec!["se.csv#1", "se.csv#3"]);
    }

    #[test]
    fn parser_reports_missing_columns() {
        let csv = "Country,a) Management documented: Response\nUK,yes\n";
        let error = OsparReturnImporter::from_reader(Cursor::new(csv), "short.csv")
            .expect_err("missing columns");

        match error {
            OsparImportError::MissingColumn { file, column } => {
                assert_eq!(file, "short.csv");
                assert_eq!(column, "b)Measures implemented: Response");
            }
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn importer_merges_every_file_in_a_directory() {
        let dir = scratch_dir("merge");
        std::fs::write(
            dir.join("b-norway.csv"),
            format!("{HEADER}\nNorway,NO-1,yes,yes,yes,yes,high\n"),
        )
        .expect("write");
        std::fs::write(
            dir.join("a-france.csv"),
            format!("{HEADER}\nFrance,FR-1,no,no,no,no,low\nFrance,FR-2,partial,no,no,no,low\n"),
        )
        .expect("write");
        std::fs::write(dir.join("notes.txt"), "ignored").expect("write");

        let records = OsparReturnImporter::load(&dir).expect("import directory");

        let ids: Vec<&str> = records.iter().map(|record| record.mpa_id.as_str()).collect();
        assert_eq!(ids, vec!["FR-1", "FR-2", "NO-1"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn importer_rejects_directories_without_returns() {
        let dir = scratch_dir("empty");
        let error = OsparReturnImporter::from_dir(&dir).expect_err("no files");
        assert!(matches!(error, OsparImportError::NoInputFiles(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = OsparReturnImporter::from_path("./does-not-exist.csv")
            .expect_err("expected io error");

        match error {
            OsparImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
