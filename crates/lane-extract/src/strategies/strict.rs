//! Strict phrasing patterns with a keyword-density fallback.

use lane_core::{CandidateMemory, Category};
use std::sync::LazyLock;

use super::{compile_rules, first_rule_match, scored_candidate, ExtractionStrategy, PatternRule};

static INSIGHT_PATTERNS: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    compile_rules(&[
        // decisions
        (r"(?:chose|chosen|use|using)\s+(.+?)\s+(?:over|instead of|rather than)\s+(.+?)\s+(?:because|for|due to|since)", Category::Patterns, 0.95),
        (r"(?:the reason|rationale)\s+(?:for|behind)\s+(.+?)(?:\.|$)", Category::Insights, 0.85),
        (r"(.+?)\s+(?:gives?|provides?|offers?)\s+(?:better|faster|lower|higher)\s+(.+?)\s+(?:than|compared to)", Category::Insights, 0.85),
        // fixes and causes
        (r"(?:fixed|solved|resolved)\s+(?:by|with)\s+(.+?)(?:\.|$)", Category::Learnings, 0.9),
        (r"(?:the (?:issue|bug|problem|error))\s+(?:was|is)\s+(?:caused by|due to)\s+(.+?)(?:\.|$)", Category::Learnings, 0.95),
        (r"(?:was caused by|caused by)\s+(.+?)(?:\s*[-–—]\s*(?:fixed|solved)|(?:\.|$))", Category::Learnings, 0.95),
        (r"(?:to fix|the fix)\s+(?:is|was)\s+(.+?)(?:\.|$)", Category::Learnings, 0.9),
        // rules
        (r"(?:pattern|approach|technique)\s*:\s*(.+?)(?:\.|$)", Category::Patterns, 0.8),
        (r"(?:always|never|should|must)\s+(.+?)\s+(?:when|before|after)\s+(.+?)(?:\.|$)", Category::Learnings, 0.85),
        (r"(?:should never be|must not be|never)\s+(.+?)(?:\.|$)", Category::Learnings, 0.8),
        // configuration
        (r"(?:configured?|set(?:ting)?|option)\s+(?:in|at)\s+([^\s]+)\s+(?:to|as|for)\s+(.+?)(?:\.|$)", Category::Context, 0.75),
        (r"(?:file|path|location)\s+(?:is|at)\s+([^\s]+)", Category::Context, 0.7),
        (r"(?:stored|saved|located)\s+(?:in|at)\s+([^\s]+)", Category::Context, 0.7),
    ])
});

/// Keyword vocabularies per category, in tie-break order.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Patterns, &["pattern", "structure", "convention", "architecture", "design", "format", "protocol"]),
    (Category::Insights, &["insight", "learned", "discovered", "realized", "found that", "turns out"]),
    (Category::Learnings, &["fix", "solved", "error", "bug", "issue", "debug", "problem", "solution"]),
    (Category::Context, &["config", "setting", "file", "path", "directory", "location", "command"]),
];

const KEYWORD_BASE_SCORE: f64 = 0.7;
const MIN_KEYWORD_HITS: usize = 2;

pub struct StrictPatternStrategy;

impl StrictPatternStrategy {
    /// Category with the most keyword hits, if it reaches the minimum.
    pub fn keyword_category(sentence: &str) -> Option<Category> {
        let lower = sentence.to_lowercase();
        let mut best: Option<(Category, usize)> = None;
        for (category, keywords) in CATEGORY_KEYWORDS {
            let hits = keywords.iter().filter(|kw| lower.contains(*kw)).count();
            if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((*category, hits));
            }
        }
        match best {
            Some((category, hits)) if hits >= MIN_KEYWORD_HITS => Some(category),
            _ => None,
        }
    }
}

impl ExtractionStrategy for StrictPatternStrategy {
    fn name(&self) -> &'static str {
        "strict_pattern"
    }

    fn extract(&self, sentence: &str, source: &str) -> Vec<CandidateMemory> {
        if let Some(candidate) = first_rule_match(&INSIGHT_PATTERNS, sentence, source, self.name()) {
            return vec![candidate];
        }
        Self::keyword_category(sentence)
            .and_then(|category| {
                scored_candidate(sentence, category, KEYWORD_BASE_SCORE, source, "keyword_fallback")
            })
            .into_iter()
            .collect()
    }
}
