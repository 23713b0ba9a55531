use crate::workflows::mepca::normalizer::clean_text;

pub(crate) fn normalize_header(value: &str) -> String {
    clean_text(value).to_ascii_lowercase()
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_header(value)
}
