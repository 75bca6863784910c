//! Relevance scoring.

use regex::Regex;
use std::sync::LazyLock;

pub const HIGH_VALUE_KEYWORDS: &[&str] = &[
    "critical", "important", "always", "never", "must", "required",
    "error", "bug", "fix", "solved", "issue", "problem",
    "performance", "security", "optimization",
    "architecture", "design", "pattern", "convention",
    "api", "endpoint", "authentication", "authorization",
];

const KEYWORD_BOOST: f64 = 0.05;
const TECH_TERM_BOOST: f64 = 0.05;
const VERBOSE_PENALTY: f64 = 0.1;
const VERBOSE_CHARS: usize = 200;

static RE_TECH_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(api|sdk|cli|ipc|socket|hook)\b").unwrap());

/// Score `text` from `base_score`, clamped to `[0.5, 1.0]`.
pub fn calculate_relevance(text: &str, base_score: f64) -> f64 {
    let lower = text.to_lowercase();
    let hits = HIGH_VALUE_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();

    let mut score = base_score + hits as f64 * KEYWORD_BOOST;
    if RE_TECH_TERM.is_match(&lower) {
        score += TECH_TERM_BOOST;
    }
    if text.chars().count() > VERBOSE_CHARS {
        score -= VERBOSE_PENALTY;
    }
    score.clamp(0.5, 1.0)
}
