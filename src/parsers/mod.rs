pub mod contact;
pub mod html;
pub mod json;
pub mod text;


pub use contact::extract_contact_fields;

/// Enum to represent the content parsers a fetched body can go through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserType {
    /// HTML parser
    Html,
    /// Plain text parser
    Text,
}

impl ParserType {
    /// Determines the parser type from a `Content-Type` header value.
    ///
    /// Missing or unknown types are treated as HTML, since most pages don't bother.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.to_lowercase().starts_with("text/plain") => {
                ::log::debug!("Classifying as Text: {}", ct);
                ParserType::Text
            }
            _ => ParserType::Html,
        }
    }
}

/// Result of parsing content
pub struct ParseResult {
    /// Extracted text content
    pub content: String,
}

impl ParseResult {
    pub fn new(content: String) -> Self {
        Self { content }
    }
}

/// Main parser that delegates to specific format parsers
pub struct Parser;

impl Parser {
    /// Parse content based on the parser type
    pub fn parse(content: &str, parser_type: ParserType) -> ParseResult {
        match parser_type {
            ParserType::Html => html::parse(content),
            ParserType::Text => text::parse(content),
        }
    }

    /// Main text of a fetched body, truncated to `max_chars` characters
    pub fn main_text(content: &str, parser_type: ParserType, max_chars: usize) -> String {
        let result = Self::parse(content, parser_type);
        crate::utils::truncate_chars(&result.content, max_chars).to_string()
    }
}
