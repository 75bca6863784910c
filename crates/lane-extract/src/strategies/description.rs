//! Component and architecture explanations.

use lane_core::{CandidateMemory, Category};
use std::sync::LazyLock;

use super::{compile_rules, first_rule_match, ExtractionStrategy, PatternRule};

static DESCRIPTION_PATTERNS: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    compile_rules(&[
        (r"[Tt]he\s+([A-Za-z][A-Za-z0-9 _-]{2,30}?)\s+(?:is|are)\s+(?:a|an|the)\s+([A-Za-z][A-Za-z0-9 _-]{2,30}?)\s+that\s+(?:provides?|handles?|manages?|communicates?|connects?)\s+(.{10,80})", Category::Context, 0.8),
        (r"(?:It|[A-Za-z][A-Za-z0-9 _-]{2,25}?)\s+(?:communicates?|connects?|talks?)\s+(?:with|to)\s+(?:the\s+)?([A-Za-z][A-Za-z0-9 _-]{2,30}?)\s+(?:via|through|using)\s+([A-Za-z][A-Za-z0-9 _-]{2,30})", Category::Context, 0.85),
        (r"([A-Za-z][A-Za-z0-9 _-]{2,25}?)\s+(?:serves?|acts?)\s+as\s+(?:the\s+)?([A-Za-z][A-Za-z0-9 _-]{2,40})", Category::Context, 0.8),
        (r"(?:core\s+)?(?:idea|purpose|goal)\s*(?:is|:)\s*(.{15,120})", Category::Insights, 0.85),
    ])
});

pub struct DescriptionStrategy;

impl ExtractionStrategy for DescriptionStrategy {
    fn name(&self) -> &'static str {
        "description"
    }

    fn extract(&self, sentence: &str, source: &str) -> Vec<CandidateMemory> {
        first_rule_match(&DESCRIPTION_PATTERNS, sentence, source, self.name())
            .into_iter()
            .collect()
    }
}
