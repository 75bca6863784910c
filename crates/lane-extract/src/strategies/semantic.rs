//! Indicator-vocabulary scoring across eight learning signals.

use lane_core::{CandidateMemory, Category};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::{scored_candidate, ExtractionStrategy};

/// Labelled indicator vocabularies.
pub const LEARNING_INDICATORS: &[(&str, &[&str])] = &[
    ("bug_fix", &["fix", "fixed", "resolved", "solved", "patched", "corrected", "repaired"]),
    ("root_cause", &["caused", "cause", "because", "due", "resulted", "source", "root", "reason"]),
    ("decision", &["chose", "decided", "picked", "selected", "went", "opted", "prefer", "use"]),
    ("comparison", &["over", "instead", "rather", "better", "worse", "faster", "slower", "simpler", "easier"]),
    ("rule", &["always", "never", "must", "should", "avoid", "prefer", "ensure", "require"]),
    ("location", &["stored", "located", "found", "lives", "config", "path", "file", "directory"]),
    ("tuning", &["threshold", "too", "low", "high", "value", "adjusted", "changed", "tuned", "returning"]),
    ("architecture", &["component", "extension", "server", "client", "interface", "layer", "module", "provides", "communicates"]),
];

pub const SEMANTIC_THRESHOLD: f64 = 0.35;
const MIN_SIGNALS: usize = 2;

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Per-signal hit counts for one sentence.
#[derive(Debug, Default, Clone)]
pub struct IndicatorHits {
    pub signals: Vec<(&'static str, usize)>,
}

impl IndicatorHits {
    pub fn measure(sentence: &str) -> Self {
        let lower = sentence.to_lowercase();
        let words: HashSet<&str> = RE_WORD.find_iter(&lower).map(|m| m.as_str()).collect();
        let signals = LEARNING_INDICATORS
            .iter()
            .filter_map(|(label, vocab)| {
                let hits = vocab.iter().filter(|w| words.contains(*w)).count();
                (hits > 0).then_some((*label, hits))
            })
            .collect();
        Self { signals }
    }

    pub fn has(&self, label: &str) -> bool {
        self.signals.iter().any(|(l, _)| *l == label)
    }

    pub fn total(&self) -> usize {
        self.signals.iter().map(|(_, n)| n).sum()
    }

    /// `min(1, 0.2 * signals + 0.1 * hits)`.
    pub fn score(&self) -> f64 {
        (self.signals.len() as f64 * 0.2 + self.total() as f64 * 0.1).min(1.0)
    }

    /// Category and base score by signal priority.
    pub fn classify(&self) -> (Category, f64) {
        if self.has("bug_fix") || self.has("root_cause") {
            (Category::Learnings, 0.8)
        } else if self.has("decision") || self.has("comparison") {
            (Category::Patterns, 0.8)
        } else if self.has("rule") {
            (Category::Learnings, 0.75)
        } else if self.has("location") {
            (Category::Context, 0.7)
        } else {
            (Category::Insights, 0.7)
        }
    }
}

pub struct SemanticStrategy;

impl ExtractionStrategy for SemanticStrategy {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn extract(&self, sentence: &str, source: &str) -> Vec<CandidateMemory> {
        let hits = IndicatorHits::measure(sentence);
        if hits.signals.len() < MIN_SIGNALS || hits.score() < SEMANTIC_THRESHOLD {
            return Vec::new();
        }
        let (category, base) = hits.classify();
        scored_candidate(sentence, category, base, source, self.name())
            .into_iter()
            .collect()
    }
}
