use url::Url;

/// Suffixes under which the registrable domain needs three labels
const COMPOUND_SUFFIXES: [&str; 11] = [
    "co.uk", "org.uk", "ac.uk", "gov.uk", "ltd.uk", "plc.uk", "me.uk", "net.uk", "nhs.uk",
    "sch.uk", "police.uk",
];

/// Returns at most `max_chars` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Registrable domain of a URL, e.g. `https://www.foo.org.uk/x` gives `foo.org.uk`.
///
/// Falls back to the lower-cased input when the URL has no host.
pub fn domain_from_url(url: &str) -> String {
    let host = match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_lowercase(),
            None => return url.to_lowercase(),
        },
        Err(_) => return url.to_lowercase(),
    };

    let parts: Vec<&str> = host.split('.').filter(|p| !p.is_empty()).collect();
    if parts.len() <= 2 {
        return parts.join(".");
    }

    let last_two = format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]);
    if COMPOUND_SUFFIXES.contains(&last_two.as_str()) {
        format!("{}.{}", parts[parts.len() - 3], last_two)
    } else {
        last_two
    }
}

/// Turns an organization name into a host label, joining words with `separator`
pub fn slugify(name: &str, separator: &str) -> String {
    name.to_lowercase()
        .replace('&', "and")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(separator)
}

/// Words that never identify a place on their own
const GENERIC_PLACE_WORDS: [&str; 14] = [
    "uk", "united", "kingdom", "england", "scotland", "wales", "greater", "st", "saint", "city",
    "centre", "center", "upon", "the",
];

/// Locality term of a search location: its first word that is not a country or generic place
/// word, lower-cased. Empty when there is none.
///
/// `"Manchester UK"` gives `["manchester"]`, `"St Helens UK"` gives `["helens"]`.
pub fn locality_terms(location: &str) -> Vec<String> {
    location
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|w| w.trim().to_lowercase())
        .find(|w| w.len() > 1 && !GENERIC_PLACE_WORDS.contains(&w.as_str()))
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("£££", 2), "££");
        assert_eq!(truncate_chars("", 2), "");
    }

    #[test]
    fn test_domain_from_url() {
        assert_eq!(
            domain_from_url("https://www.salfordfoodbank.org.uk/get-help"),
            "salfordfoodbank.org.uk"
        );
        assert_eq!(
            domain_from_url("https://salfordfoodbank.org.uk"),
            "salfordfoodbank.org.uk"
        );
        assert_eq!(domain_from_url("https://www.yelp.com/search"), "yelp.com");
        assert_eq!(domain_from_url("https://bbc.co.uk/news"), "bbc.co.uk");
        assert_eq!(domain_from_url("not a url"), "not a url");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Salford Food Bank", ""), "salfordfoodbank");
        assert_eq!(slugify("Salford Food Bank", "-"), "salford-food-bank");
        assert_eq!(slugify("Bread & Butter Pantry", "-"), "bread-and-butter-pantry");
    }

    #[test]
    fn test_locality_terms() {
        assert_eq!(locality_terms("Manchester UK"), vec!["manchester"]);
        assert_eq!(locality_terms("Newcastle upon Tyne, UK"), vec!["newcastle"]);
    }

    #[test]
    fn test_locality_terms_skip_generic_words() {
        assert_eq!(locality_terms("Bristol City Centre UK"), vec!["bristol"]);
        assert_eq!(locality_terms("St Helens UK"), vec!["helens"]);
        assert_eq!(locality_terms("Greater Manchester"), vec!["manchester"]);
        assert!(locality_terms("UK").is_empty());
    }
}
