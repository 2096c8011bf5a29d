use std::collections::HashSet;

use crate::types::Record;

fn string_key(item: &str) -> String {
    item.trim().to_lowercase()
}

/// Drop later duplicates of case-insensitive, trimmed string equality.
///
/// The first occurrence keeps its position and original spelling.
/// Entries that are empty after trimming are dropped entirely.
pub fn dedupe_strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let item = item.as_ref();
        let key = string_key(item);
        if key.is_empty() {
            continue;
        }
        if seen.insert(key) {
            out.push(item.to_string());
        }
    }
    out
}

/// Drop later duplicates of exact record equality (same key/value pairs).
pub fn dedupe_records<'a, I>(items: I) -> Vec<Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|record| seen.insert(*record))
        .cloned()
        .collect()
}
