//! Candidate extraction strategies.
//!
//! Each strategy inspects one sentence and proposes zero or more candidates.
//! Several may claim the same sentence; the orchestrator deduplicates once.

pub mod description;
pub mod semantic;
pub mod strict;
pub mod structural;
pub mod template;

use lane_core::{CandidateMemory, Category};
use regex::Regex;

use crate::quality::clean_content;
use crate::scoring::calculate_relevance;

pub use description::DescriptionStrategy;
pub use semantic::SemanticStrategy;
pub use strict::StrictPatternStrategy;
pub use structural::StructuralStrategy;
pub use template::TemplateStrategy;

/// A single sentence-level extraction heuristic.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, sentence: &str, source: &str) -> Vec<CandidateMemory>;
}

/// All heuristics in their fixed evaluation order.
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(StrictPatternStrategy),
        Box::new(TemplateStrategy),
        Box::new(StructuralStrategy),
        Box::new(SemanticStrategy),
        Box::new(DescriptionStrategy),
    ]
}

/// A compiled `(regex, category, base_score)` rule.
pub struct PatternRule {
    pub regex: Regex,
    pub category: Category,
    pub base_score: f64,
}

/// Compile a rule table. Every pattern is matched case-insensitively.
pub(crate) fn compile_rules(table: &[(&str, Category, f64)]) -> Vec<PatternRule> {
    table
        .iter()
        .map(|(pattern, category, base_score)| PatternRule {
            regex: Regex::new(&format!("(?i){pattern}")).unwrap(),
            category: *category,
            base_score: *base_score,
        })
        .collect()
}

/// First matching rule wins; the whole sentence becomes the candidate.
pub(crate) fn first_rule_match(
    rules: &[PatternRule],
    sentence: &str,
    source: &str,
    strategy: &str,
) -> Option<CandidateMemory> {
    let rule = rules.iter().find(|r| r.regex.is_match(sentence))?;
    scored_candidate(sentence, rule.category, rule.base_score, source, strategy)
}

/// Gate `sentence` through quality checks and score it.
pub(crate) fn scored_candidate(
    sentence: &str,
    category: Category,
    base_score: f64,
    source: &str,
    strategy: &str,
) -> Option<CandidateMemory> {
    let content = clean_content(sentence)?;
    let score = calculate_relevance(sentence, base_score);
    Some(CandidateMemory::new(content, category, score, source).with_strategy(strategy))
}
