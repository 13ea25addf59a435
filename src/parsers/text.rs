use crate::parsers::ParseResult;

/// Parses plain text content.
///
/// Collapses every run of whitespace, newlines included, into a single space.
pub fn parse(text: &str) -> ParseResult {
    ParseResult::new(normalize_whitespace(text))
}

/// Normalizes whitespace within a single line or paragraph
pub fn normalize_whitespace(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}
