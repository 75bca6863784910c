//! Greedy budget selection with a summarization fallback.

use crate::section::Section;

#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub kept: Vec<Section>,
    pub removed: Vec<Section>,
    /// Sum of the kept sections' token estimates.
    pub kept_tokens: usize,
}

/// Budget knobs for [`select_sections`].
#[derive(Debug, Clone, Copy)]
pub struct SelectPolicy {
    pub target_tokens: usize,
    pub summarize_max_lines: usize,
    /// Sections scoring above this get a summarized second chance.
    pub summarize_threshold: f64,
}

impl Default for SelectPolicy {
    fn default() -> Self {
        Self {
            target_tokens: 2000,
            summarize_max_lines: 3,
            summarize_threshold: 0.7,
        }
    }
}

/// Walk ranked sections and keep what fits. Never exceeds the budget.
pub fn select_sections(ranked: Vec<Section>, policy: &SelectPolicy) -> Selection {
    let mut selection = Selection::default();

    for section in ranked {
        if selection.kept_tokens + section.tokens() <= policy.target_tokens {
            selection.kept_tokens += section.tokens();
            selection.kept.push(section);
            continue;
        }
        if section.score() > policy.summarize_threshold {
            let summary = section.summarized(policy.summarize_max_lines);
            if selection.kept_tokens + summary.tokens() <= policy.target_tokens {
                selection.kept_tokens += summary.tokens();
                selection.kept.push(summary);
                continue;
            }
        }
        selection.removed.push(section);
    }
    selection
}
