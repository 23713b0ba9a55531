use super::normalizer::normalize_header;
use crate::workflows::mepca::SurveyField;
use std::collections::HashMap;
use std::sync::OnceLock;

pub(crate) const COUNTRY_HEADER: &str = "Country";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Column {
    Country,
    MpaId,
    Survey(SurveyField),
}

static OSPAR_HEADER_MAP: OnceLock<HashMap<String, Column>> = OnceLock::new();

pub(crate) fn column_for_header(header: &str) -> Option<Column> {
    ospar_header_map().get(&normalize_header(header)).copied()
}

/// Header used when writing a field back out, as it appears in the MPA_MGT sheet.
pub(crate) const fn export_header(field: SurveyField) -> &'static str {
    match field {
        SurveyField::QuestionA => "a) Management documented: Response",
        SurveyField::QuestionB => "b)Measures implemented: Response",
        SurveyField::QuestionC => "c) Monitoring in place: Response",
        SurveyField::QuestionD => "d)Moving towards objectives - Response",
        SurveyField::QuestionDConfidence => "d)Moving towards objectives - Confidence score",
    }
}

fn ospar_header_map() -> &'static HashMap<String, Column> {
    OSPAR_HEADER_MAP.get_or_init(|| {
        const HEADER_TO_COLUMN: &[(&str, Column)] = &[
            // Identity
            ("Country", Column::Country),
            ("MPA ID", Column::MpaId),
            ("MPA_ID", Column::MpaId),
            ("MPA Name", Column::MpaId),
            ("MPA", Column::MpaId),
            // Question A
            (
                "a) Management documented: Response",
                Column::Survey(SurveyField::QuestionA),
            ),
            (
                "a)Management documented: Response",
                Column::Survey(SurveyField::QuestionA),
            ),
            (
                "a) Management documented - Response",
                Column::Survey(SurveyField::QuestionA),
            ),
            // Question B
            (
                "b)Measures implemented: Response ",
                Column::Survey(SurveyField::QuestionB),
            ),
            (
                "b) Measures implemented: Response",
                Column::Survey(SurveyField::QuestionB),
            ),
            (
                "b) Measures implemented - Response",
                Column::Survey(SurveyField::QuestionB),
            ),
            // Question C
            (
                "c) Monitoring in place: Response",
                Column::Survey(SurveyField::QuestionC),
            ),
            (
                "c)Monitoring in place: Response",
                Column::Survey(SurveyField::QuestionC),
            ),
            (
                "c) Monitoring in place - Response",
                Column::Survey(SurveyField::QuestionC),
            ),
            // Question D
            (
                "d)Moving towards objectives - Response",
                Column::Survey(SurveyField::QuestionD),
            ),
            (
                "d) Moving towards objectives - Response",
                Column::Survey(SurveyField::QuestionD),
            ),
            (
                "d) Moving towards objectives: Response",
                Column::Survey(SurveyField::QuestionD),
            ),
            (
                "d)Moving towards objectives - Confidence score",
                Column::Survey(SurveyField::QuestionDConfidence),
            ),
            (
                "d) Moving towards objectives - Confidence score",
                Column::Survey(SurveyField::QuestionDConfidence),
            ),
            (
                "d) Moving towards objectives: Confidence score",
                Column::Survey(SurveyField::QuestionDConfidence),
            ),
        ];

        let mut map = HashMap::with_capacity(HEADER_TO_COLUMN.len());
        for (header, column) in HEADER_TO_COLUMN {
            map.insert(normalize_header(header), *column);
        }
        map
    })
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(header: &str) -> Option<Column> {
    column_for_header(header)
}
