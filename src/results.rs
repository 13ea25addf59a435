use serde::{Deserialize, Serialize};
use std::fmt;

/// A single organic hit returned by the search collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title of the hit
    #[serde(default)]
    pub title: String,

    /// URL of the hit
    #[serde(alias = "link")]
    pub url: String,
}

impl SearchResult {
    /// Create a new search result
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// What a fetched page is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageClassification {
    /// Describes one food bank
    Single,
    /// Lists several food banks
    Directory,
    /// Unrelated to food banks
    Other,
}

impl PageClassification {
    /// Maps a one-word model answer onto a classification. Anything outside the
    /// vocabulary is `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "single" => PageClassification::Single,
            "directory" => PageClassification::Directory,
            _ => PageClassification::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageClassification::Single => "single",
            PageClassification::Directory => "directory",
            PageClassification::Other => "other",
        }
    }
}

impl fmt::Display for PageClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact details recovered from raw page text by pattern matching
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactFields {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub postcode: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
}

impl ContactFields {
    /// True when no pattern family matched
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.phone.is_none()
            && self.postcode.is_none()
            && self.address.is_none()
            && self.opening_hours.is_none()
    }
}

/// The canonical structured description of one food bank.
///
/// Every field is always serialized; missing values come out as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FoodbankRecord {
    pub name: Option<String>,
    pub address: Option<String>,
    pub postcode: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub opening_hours: Option<String>,
    pub website: Option<String>,
    pub special_requirements: Option<String>,
}

impl FoodbankRecord {
    /// True when every field is null
    pub fn is_empty(&self) -> bool {
        *self == FoodbankRecord::default()
    }

    /// Fills null fields from pattern-extracted contact details. Returns the names of the
    /// fields that were filled.
    pub fn merge_contact_fields(&mut self, contact: &ContactFields) -> Vec<&'static str> {
        let mut filled = Vec::new();
        let pairs: [(&mut Option<String>, &Option<String>, &'static str); 5] = [
            (&mut self.email, &contact.email, "Email"),
            (&mut self.phone, &contact.phone, "Phone"),
            (&mut self.postcode, &contact.postcode, "Postcode"),
            (&mut self.address, &contact.address, "Address"),
            (&mut self.opening_hours, &contact.opening_hours, "OpeningHours"),
        ];
        for (slot, found, label) in pairs {
            if slot.is_none() {
                if let Some(value) = found.as_ref().filter(|v| !v.is_empty()) {
                    *slot = Some(value.clone());
                    filled.push(label);
                }
            }
        }
        filled
    }
}

impl From<ContactFields> for FoodbankRecord {
    fn from(contact: ContactFields) -> Self {
        Self {
            email: contact.email,
            phone: contact.phone,
            postcode: contact.postcode,
            address: contact.address,
            opening_hours: contact.opening_hours,
            ..Self::default()
        }
    }
}

/// Stands in for a record when a page was skipped or could not be extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Human-readable reason
    pub error: String,

    /// Raw model output kept for diagnostics
    #[serde(default)]
    pub raw: Option<String>,
}

impl ErrorRecord {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            raw: None,
        }
    }

    pub fn with_raw(error: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            raw: Some(raw.into()),
        }
    }
}

/// Outcome of processing one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Structured {
    // Error first so untagged deserialization does not swallow error objects as empty records
    Error(ErrorRecord),
    Record(FoodbankRecord),
}

impl Structured {
    pub fn record(&self) -> Option<&FoodbankRecord> {
        match self {
            Structured::Record(record) => Some(record),
            Structured::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Structured::Error(_))
    }
}

impl From<FoodbankRecord> for Structured {
    fn from(record: FoodbankRecord) -> Self {
        Structured::Record(record)
    }
}

impl From<ErrorRecord> for Structured {
    fn from(error: ErrorRecord) -> Self {
        Structured::Error(error)
    }
}

/// One entry per visited URL, appended to the run's result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Search hit title, or the link itself for expanded directory links
    pub name: Option<String>,

    /// URL that was visited
    pub url: String,

    /// Registrable domain of the URL
    pub domain: String,

    /// Location the search was run for
    pub location: String,

    /// Extracted record or the reason there is none
    pub structured: Structured,
}

impl ResultEntry {
    pub fn new(
        name: Option<String>,
        url: impl Into<String>,
        domain: impl Into<String>,
        location: impl Into<String>,
        structured: impl Into<Structured>,
    ) -> Self {
        Self {
            name,
            url: url.into(),
            domain: domain.into(),
            location: location.into(),
            structured: structured.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_every_field() {
        let record = FoodbankRecord {
            name: Some("Acme Foodbank".to_string()),
            ..FoodbankRecord::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "Name",
            "Address",
            "Postcode",
            "Phone",
            "Email",
            "OpeningHours",
            "Website",
            "SpecialRequirements",
        ] {
            assert!(object.contains_key(key), "missing key {}", key);
        }
        assert_eq!(object["Name"], "Acme Foodbank");
        assert!(object["Address"].is_null());
    }

    #[test]
    fn test_merge_fills_only_missing_fields() {
        let mut record = FoodbankRecord {
            name: Some("Acme".to_string()),
            phone: Some("0161 000 0000".to_string()),
            ..FoodbankRecord::default()
        };
        let contact = ContactFields {
            phone: Some("0800 111 2222".to_string()),
            email: Some("hello@acme.org.uk".to_string()),
            ..ContactFields::default()
        };

        let filled = record.merge_contact_fields(&contact);

        assert_eq!(filled, vec!["Email"]);
        assert_eq!(record.phone.as_deref(), Some("0161 000 0000"));
        assert_eq!(record.email.as_deref(), Some("hello@acme.org.uk"));
    }

    #[test]
    fn test_classification_labels() {
        assert_eq!(
            PageClassification::from_label(" Directory\n"),
            PageClassification::Directory
        );
        assert_eq!(
            PageClassification::from_label("single"),
            PageClassification::Single
        );
        assert_eq!(
            PageClassification::from_label("single page"),
            PageClassification::Other
        );
    }

    #[test]
    fn test_search_result_accepts_link_key() {
        let hit: SearchResult =
            serde_json::from_str(r#"{"title": "Hulme Pantry", "link": "https://hulmepantry.org.uk/"}"#)
                .unwrap();
        assert_eq!(hit, SearchResult::new("Hulme Pantry", "https://hulmepantry.org.uk/"));

        let untitled: SearchResult =
            serde_json::from_str(r#"{"url": "https://hulmepantry.org.uk/"}"#).unwrap();
        assert_eq!(untitled.title, "");
    }

    #[test]
    fn test_structured_untagged_roundtrip_keeps_errors() {
        let entry = Structured::Error(ErrorRecord::new("Skipped page classified as 'other'"));
        let json = serde_json::to_string(&entry).unwrap();
        let back: Structured = serde_json::from_str(&json).unwrap();
        assert!(back.is_error());
    }
}
