//! Structured record extraction: model first, pattern matching to fill the gaps.

use crate::error::{Error, Result};
use crate::llm::{CompletionRequest, LanguageModel};
use crate::parsers::contact::extract_contact_fields;
use crate::parsers::json;
use crate::results::{ErrorRecord, FoodbankRecord, Structured};
use serde_json::{Map, Value};

const EXTRACT_MAX_TOKENS: u32 = 600;
const EXTRACT_TEMPERATURE: f32 = 0.1;

const EXTRACT_INSTRUCTIONS: &str = "\
You are a helpful, very diligent research assistant that extracts structured data about a UK \
food bank from the provided website text. Return ONLY a single JSON object with exactly these \
fields: Name, Address, Postcode, Phone, Email, OpeningHours, Website, SpecialRequirements. \
OpeningHours must be a single string. If any information is missing, use null. Do NOT include \
explanations, comments, or any extra text. Only return valid JSON and nothing else.";

// Accepted spellings per field; keys are compared ignoring case, spaces, '_' and '-'
const NAME_KEYS: &[&str] = &["Name", "Foodbank Name", "Organisation"];
const ADDRESS_KEYS: &[&str] = &["Address", "Street Address"];
const POSTCODE_KEYS: &[&str] = &["Postcode", "Post Code", "Zip"];
const PHONE_KEYS: &[&str] = &["Phone", "Telephone", "Phone Number"];
const EMAIL_KEYS: &[&str] = &["Email", "Email Address"];
const HOURS_KEYS: &[&str] = &["OpeningHours", "Opening Times", "Hours"];
const WEBSITE_KEYS: &[&str] = &["Website", "Url", "Web"];
const REQUIREMENTS_KEYS: &[&str] = &[
    "SpecialRequirements",
    "Any special requirements",
    "Requirements",
];

/// Turns page text into a [`FoodbankRecord`], degrading to pattern extraction or an
/// [`ErrorRecord`] instead of failing.
pub struct RecordExtractor<'a> {
    model: &'a dyn LanguageModel,
}

impl<'a> RecordExtractor<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self { model }
    }

    /// Extract a record from `text`. The caller truncates `text` to fit the model budget.
    pub async fn extract(&self, text: &str) -> Structured {
        let prompt = format!("{}\n\n{}", EXTRACT_INSTRUCTIONS, text);
        let request =
            CompletionRequest::new(prompt, EXTRACT_MAX_TOKENS).with_temperature(EXTRACT_TEMPERATURE);

        let parsed = match self.model.complete(request).await {
            Ok(raw) => parse_model_output(&raw),
            Err(e) => Err(e),
        };

        resolve(parsed, text)
    }
}

/// Combines the model outcome with pattern extraction over `text`.
///
/// A record with a name is returned untouched. A nameless or empty record has its null
/// fields filled from the patterns. A failure is replaced by the pattern result when that
/// found anything, otherwise it becomes an error record.
pub fn resolve(parsed: Result<FoodbankRecord>, text: &str) -> Structured {
    match parsed {
        Ok(record) if record.name.is_some() => Structured::Record(record),
        Ok(mut record) => {
            ::log::info!("Model record incomplete, trying regex extraction");
            let contact = extract_contact_fields(text);
            for field in record.merge_contact_fields(&contact) {
                ::log::debug!("Regex filled {}", field);
            }
            Structured::Record(record)
        }
        Err(e) => {
            ::log::info!("Model extraction failed ({}), trying regex extraction", e);
            let contact = extract_contact_fields(text);
            if !contact.is_empty() {
                ::log::info!("Using regex extraction as fallback");
                return Structured::Record(FoodbankRecord::from(contact));
            }
            match e {
                Error::ExtractionParse { reason, raw } => {
                    Structured::Error(ErrorRecord::with_raw(reason, raw))
                }
                other => Structured::Error(ErrorRecord::new(other.to_string())),
            }
        }
    }
}

/// Parses a free-text model answer into a record.
///
/// The first brace-delimited object is parsed; an `OpeningHours` object of day to hours is
/// flattened to `"Day: hours, Day: hours"`.
pub fn parse_model_output(raw: &str) -> Result<FoodbankRecord> {
    let Some(span) = json::first_object_span(raw) else {
        return Err(Error::ExtractionParse {
            reason: "No JSON found".to_string(),
            raw: raw.to_string(),
        });
    };

    let object: Map<String, Value> = match serde_json::from_str(span) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            return Err(Error::ExtractionParse {
                reason: "JSON decode failed: not an object".to_string(),
                raw: span.to_string(),
            });
        }
        Err(e) => {
            return Err(Error::ExtractionParse {
                reason: format!("JSON decode failed: {}", e),
                raw: span.to_string(),
            });
        }
    };

    let field = |keys: &[&str]| json::lookup(&object, keys).and_then(json::value_to_text);

    Ok(FoodbankRecord {
        name: field(NAME_KEYS),
        address: field(ADDRESS_KEYS),
        postcode: field(POSTCODE_KEYS),
        phone: field(PHONE_KEYS),
        email: field(EMAIL_KEYS),
        opening_hours: field(HOURS_KEYS),
        website: field(WEBSITE_KEYS),
        special_requirements: field(REQUIREMENTS_KEYS),
    })
}
