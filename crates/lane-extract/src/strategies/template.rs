//! Decision-verb plus comparison-marker co-occurrence.

use lane_core::{CandidateMemory, Category};

use super::{scored_candidate, ExtractionStrategy};

pub const DECISION_VERBS: &[&str] = &[
    "chose", "choose", "chosen", "picked", "pick", "selected", "select",
    "decided", "decide", "went", "go", "opted", "opt", "used", "use",
    "using", "prefer", "preferred", "switched", "switch", "moved",
];

pub const COMPARISON_WORDS: &[&str] = &[
    "over", "instead of", "rather than", "not", "vs", "versus",
    "instead", "replacing", "replace", "swap", "swapped",
];

const REASON_WORDS: &[&str] = &["because", "since", "for", "as", "given", "so"];

const BASE_SCORE: f64 = 0.85;
const WITH_REASON_SCORE: f64 = 0.9;

pub struct TemplateStrategy;

impl ExtractionStrategy for TemplateStrategy {
    fn name(&self) -> &'static str {
        "template"
    }

    fn extract(&self, sentence: &str, source: &str) -> Vec<CandidateMemory> {
        let lower = sentence.to_lowercase();
        let has_verb = DECISION_VERBS.iter().any(|v| lower.contains(v));
        let has_comparison = COMPARISON_WORDS.iter().any(|w| lower.contains(w));
        if !(has_verb && has_comparison) {
            return Vec::new();
        }

        let has_reason = REASON_WORDS.iter().any(|w| lower.contains(w))
            || sentence.contains(':')
            || sentence.contains('-');
        let base = if has_reason { WITH_REASON_SCORE } else { BASE_SCORE };

        scored_candidate(sentence, Category::Patterns, base, source, self.name())
            .into_iter()
            .collect()
    }
}
