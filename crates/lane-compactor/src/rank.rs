//! Importance ranking.

use crate::section::Section;

pub const BASE_SCORE: f64 = 0.5;

/// Title keywords worth keeping.
pub const IMPORTANT_KEYWORDS: &[&str] = &[
    "pattern", "insight", "learning", "error", "important", "note", "warning", "todo",
    "api", "authentication", "database", "configuration", "deployment", "security", "architecture",
];

const CODE_MARKERS: &[&str] = &["class ", "def ", "function "];

pub fn importance(section: &Section, preserve: &[String]) -> f64 {
    let mut score = BASE_SCORE;
    if preserve.iter().any(|p| *p == section.title) {
        score += 1.0;
    }

    let title = section.title.to_lowercase();
    score += 0.3 * IMPORTANT_KEYWORDS.iter().filter(|kw| title.contains(*kw)).count() as f64;

    let body = section.body();
    if CODE_MARKERS.iter().any(|m| body.contains(m)) {
        score += 0.2;
    }

    let tokens = section.tokens();
    if tokens < 10 {
        score -= 0.2;
    }
    if tokens > 500 {
        score -= 0.1;
    }
    score
}

/// Score every section and sort by descending importance (stable).
pub fn rank_sections(mut sections: Vec<Section>, preserve: &[String]) -> Vec<Section> {
    for section in &mut sections {
        section.importance_score = Some(importance(section, preserve));
    }
    sections.sort_by(|a, b| b.score().total_cmp(&a.score()));
    sections
}
