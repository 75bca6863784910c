//! Exact-prefix section deduplication.

use std::collections::HashSet;

use crate::section::Section;

const SIGNATURE_CHARS: usize = 100;

/// Whitespace-normalized lowercase content, first 100 chars.
pub fn signature(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(SIGNATURE_CHARS)
        .collect()
}

/// First occurrence of each signature wins; later copies are dropped.
pub fn dedupe_sections(sections: Vec<Section>) -> Vec<Section> {
    let mut seen = HashSet::new();
    sections
        .into_iter()
        .filter(|s| seen.insert(signature(&s.body())))
        .collect()
}
