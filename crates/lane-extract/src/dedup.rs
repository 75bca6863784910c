//! Score-based deduplication of extracted candidates.

use lane_core::CandidateMemory;
use std::collections::HashMap;

const SIGNATURE_CHARS: usize = 50;

/// First 50 alphanumeric characters of the lowercased content.
pub fn signature(content: &str) -> String {
    content
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(SIGNATURE_CHARS)
        .collect()
}

/// Keep the highest-scoring candidate per signature. Groups keep first-seen
/// order; equal scores keep the earlier candidate.
pub fn dedupe_by_score(candidates: Vec<CandidateMemory>) -> Vec<CandidateMemory> {
    let mut slot_of: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<CandidateMemory> = Vec::new();

    for candidate in candidates {
        let sig = signature(&candidate.content);
        match slot_of.get(&sig) {
            Some(&slot) => {
                if candidate.relevance_score > kept[slot].relevance_score {
                    kept[slot] = candidate;
                }
            }
            None => {
                slot_of.insert(sig, kept.len());
                kept.push(candidate);
            }
        }
    }
    kept
}
