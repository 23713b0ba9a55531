use super::mapping::{column_for_header, export_header, Column, COUNTRY_HEADER};
use super::OsparImportError;
use crate::workflows::mepca::{RawSurveyRecord, SurveyField};
use csv::StringRecord;
use std::io::Read;

/// Column positions resolved from a header row.
#[derive(Debug, Default)]
struct ColumnLayout {
    country: Option<usize>,
    mpa_id: Option<usize>,
    survey: [Option<usize>; 5],
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord, file: &str) -> Result<Self, OsparImportError> {
        let mut layout = Self::default();

        for (index, header) in headers.iter().enumerate() {
            match column_for_header(header) {
                Some(Column::Country) => {
                    layout.country.get_or_insert(index);
                }
                Some(Column::MpaId) => {
                    layout.mpa_id.get_or_insert(index);
                }
                Some(Column::Survey(field)) => {
                    layout.survey[field as usize].get_or_insert(index);
                }
                None => {}
            }
        }

        if layout.country.is_none() {
            return Err(OsparImportError::MissingColumn {
                file: file.to_string(),
                column: COUNTRY_HEADER,
            });
        }
        for field in SurveyField::ordered() {
            if layout.survey[field as usize].is_none() {
                return Err(OsparImportError::MissingColumn {
                    file: file.to_string(),
                    column: export_header(field),
                });
            }
        }

        Ok(layout)
    }

    fn cell<'r>(&self, row: &'r StringRecord, index: Option<usize>) -> Option<&'r str> {
        index
            .and_then(|index| row.get(index))
            .filter(|value| !value.trim().is_empty())
    }
}

pub(crate) fn parse_records<R: Read>(
    reader: R,
    file: &str,
) -> Result<Vec<RawSurveyRecord>, OsparImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let layout = ColumnLayout::resolve(&headers, file)?;
    let mut records = Vec::new();

    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let mpa_id = layout
            .cell(&row, layout.mpa_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{file}#{}", index + 1));
        let country = layout.cell(&row, layout.country).unwrap_or_default();

        let mut record = RawSurveyRecord::new(mpa_id, country);
        record.source = Some(file.to_string());
        for field in SurveyField::ordered() {
            *record.cell_mut(field) = layout
                .cell(&row, layout.survey[field as usize])
                .map(str::to_string);
        }
        records.push(record);
    }

    Ok(records)
}
