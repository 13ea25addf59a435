//! Pattern-based recovery of contact details from page text.
//!
//! Used as the fallback path when model extraction is missing or incomplete. Each field takes
//! the first match; opening hours collect every per-day match, Monday through Sunday.

use crate::results::ContactFields;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+44|0)\s*(?:1|2|3|7|8|9)\d{1,4}\s*\d{3,4}\s*\d{3,4}")
        .expect("valid phone regex")
});

static POSTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{1,2}[0-9][A-Z0-9]?\s*[0-9][A-Z]{2}\b").expect("valid postcode regex")
});

const STREET_SUFFIXES: &str = "Street|Road|Avenue|Lane|Drive|Close|Way|Place|Court|Crescent|\
Terrace|Grove|Hill|Park|Square|Mews|Gardens?|Walk|Bridge|Quay|Wharf|Yard|Alley|Arcade|Boulevard|\
Circle|Commons?|Cross|End|Fields?|Gate|Green|Heath|Highway|Island|Junction|Mall|Market|Meadows?|\
Mount|Parade|Passage|Path|Piazza|Plaza|Promenade|Rise|Row|Rue|Run|Service|Services|Side|Slip|\
Spur|Strand|Subway|Thicket|Towers?|Track|Trail|Vale|Viaduct|Villas?|Vista|Wood|Wynd";

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b\d+\s+[A-Za-z\s]+(?:{})\b", STREET_SUFFIXES))
        .expect("valid address regex")
});

/// Day-name alternatives, Monday first
const DAY_ALTERNATIVES: [&str; 7] = [
    "Monday|Mon|M",
    "Tuesday|Tue|T",
    "Wednesday|Wed|W",
    "Thursday|Thu|Th",
    "Friday|Fri|F",
    "Saturday|Sat|Sa",
    "Sunday|Sun|Su",
];

const TIME_RANGE: &str =
    r"\d{1,2}(?::\d{2})?\s*(?:am|pm)?\s*-\s*\d{1,2}(?::\d{2})?\s*(?:am|pm)?";

static OPENING_HOURS_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DAY_ALTERNATIVES
        .iter()
        .map(|days| {
            Regex::new(&format!(
                r"(?i)(?:{})\s*:?\s*(?:({})|(?:closed))",
                days, TIME_RANGE
            ))
            .expect("valid opening hours regex")
        })
        .collect()
});

/// Extracts contact fields from arbitrary text. Absence of a match is not an error.
pub fn extract_contact_fields(text: &str) -> ContactFields {
    ContactFields {
        email: first_match(&EMAIL_RE, text),
        phone: first_match(&PHONE_RE, text),
        postcode: first_match(&POSTCODE_RE, text),
        address: first_match(&ADDRESS_RE, text),
        opening_hours: opening_hours(text),
    }
}

fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().to_string())
}

/// Time ranges found per day, joined with ", " in day order. "Closed" days carry no range
/// and are left out.
fn opening_hours(text: &str) -> Option<String> {
    let mut found = Vec::new();
    for re in OPENING_HOURS_RES.iter() {
        for caps in re.captures_iter(text) {
            let range = caps.get(1).map(|m| m.as_str().trim());
            if let Some(range) = range.filter(|s| !s.is_empty()) {
                found.push(range.to_string());
            }
        }
    }

    if found.is_empty() {
        None
    } else {
        Some(found.join(", "))
    }
}
