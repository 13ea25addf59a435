use crate::results::{ResultEntry, Structured};
use std::collections::HashSet;

/// Key under which an entry is considered a duplicate: the normalized address when the
/// entry has a non-empty one, otherwise the domain.
pub fn dedup_key(entry: &ResultEntry) -> String {
    let address = match &entry.structured {
        Structured::Record(record) => record
            .address
            .as_deref()
            .map(|a| a.trim().to_lowercase())
            .unwrap_or_default(),
        Structured::Error(_) => String::new(),
    };

    if address.is_empty() {
        entry.domain.trim().to_lowercase()
    } else {
        address
    }
}

/// Collapses entries sharing a key. The first occurrence wins and output keeps first-seen
/// order. Entries whose key is empty are dropped.
pub fn deduplicate(entries: Vec<ResultEntry>) -> Vec<ResultEntry> {
    let total = entries.len();
    let mut seen = HashSet::new();

    let unique: Vec<ResultEntry> = entries
        .into_iter()
        .filter(|entry| {
            let key = dedup_key(entry);
            !key.is_empty() && seen.insert(key)
        })
        .collect();

    ::log::debug!("Deduplicated {} entries down to {}", total, unique.len());
    unique
}
