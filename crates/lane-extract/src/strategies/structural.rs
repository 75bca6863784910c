//! Vocabulary-independent syntactic shapes.

use lane_core::{CandidateMemory, Category};
use std::sync::LazyLock;

use super::{compile_rules, first_rule_match, ExtractionStrategy, PatternRule};

static STRUCTURE_PATTERNS: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    compile_rules(&[
        // parameter tuning: "X was too low at Y ... now Z"
        (r"(\w+(?:\s+\w+)?)\s+(?:was|is)\s+too\s+(?:low|high)\s+(?:at\s+)?(\S+)[^.]*?(?:fixed|changed|now|using)\s+(\S+)", Category::Learnings, 0.9),
        // "X over Y: reason"
        (r"([A-Za-z][A-Za-z0-9 _-]{1,30}?)\s+over\s+([A-Za-z][A-Za-z0-9 _-]{1,30}?)\s*[:\-–—]\s*(.{10,80})", Category::Patterns, 0.9),
        // "use X, not Y"
        (r"(?:use\s+)?([A-Za-z][A-Za-z0-9 _-]{1,25}?),\s*not\s+([A-Za-z][A-Za-z0-9 _-]{1,25})", Category::Patterns, 0.85),
        // "X >> Y"
        (r"([A-Za-z][A-Za-z0-9 _-]{1,25}?)\s*>{1,2}\s*([A-Za-z][A-Za-z0-9 _-]{1,25})", Category::Patterns, 0.85),
        (r"([A-Za-z][A-Za-z0-9 _-]{1,25}?)\s+(?:is|are|was|were)\s+(?:better|faster|slower|simpler|easier|harder|safer|more|less)\s+(?:than)\s+([A-Za-z][A-Za-z0-9 _-]{1,25})", Category::Insights, 0.85),
        (r"(?:fixed|fix|solved|resolved)\s*:\s*(.{10,100})", Category::Learnings, 0.85),
        (r"(?:the\s+)?(?:cause|problem|issue|bug|root cause)\s+(?:was|is|were)\s+(.{10,100})", Category::Learnings, 0.9),
        // solution-first phrasing outranks the bare problem statement
        (r"(?:created|added|implemented|wrote)\s+(.{5,50}?)\s+(?:to|which)\s+(?:fix|handle|solve|address)(?:es|ed)?\s+(.{5,80})", Category::Learnings, 0.95),
        (r"(?:fixed|solved|resolved)\s+by\s+(?:creating|adding|implementing|using)\s+(.{10,100})", Category::Learnings, 0.95),
        (r"(?:the\s+)?(?:fix|solution|answer)\s+(?:was|is)\s+to\s+(.{10,100})", Category::Learnings, 0.95),
    ])
});

pub struct StructuralStrategy;

impl ExtractionStrategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn extract(&self, sentence: &str, source: &str) -> Vec<CandidateMemory> {
        first_rule_match(&STRUCTURE_PATTERNS, sentence, source, self.name())
            .into_iter()
            .collect()
    }
}
