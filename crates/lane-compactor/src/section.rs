//! Heading-delimited sections.

use lane_core::estimate_tokens;
use serde::{Deserialize, Serialize};

/// A contiguous span of text under one markdown heading. `tokens` always
/// reflects the current content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub level: usize,
    pub title: String,
    content: Vec<String>,
    tokens: usize,
    pub importance_score: Option<f64>,
}

impl Section {
    pub fn new(level: usize, title: impl Into<String>, content: Vec<String>) -> Self {
        let tokens = estimate_tokens(&content.join("\n"));
        Self {
            level,
            title: title.into(),
            content,
            tokens,
            importance_score: None,
        }
    }

    pub fn content(&self) -> &[String] {
        &self.content
    }

    pub fn tokens(&self) -> usize {
        self.tokens
    }

    pub fn body(&self) -> String {
        self.content.join("\n")
    }

    /// Score assigned by the ranker, or 0 when unranked.
    pub fn score(&self) -> f64 {
        self.importance_score.unwrap_or(0.0)
    }

    /// Copy keeping the first `max_lines` lines plus an elision marker.
    pub fn summarized(&self, max_lines: usize) -> Self {
        let mut content: Vec<String> = self.content.iter().take(max_lines).cloned().collect();
        if self.content.len() > max_lines {
            content.push(format!("... ({} more lines)", self.content.len() - max_lines));
        }
        let mut summary = Self::new(self.level, self.title.clone(), content);
        summary.importance_score = self.importance_score;
        summary
    }
}

/// Parser output. Text ahead of the first heading has no section to live in
/// and is reported separately.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub sections: Vec<Section>,
    pub preamble: Vec<String>,
}

impl ParsedDocument {
    pub fn has_preamble(&self) -> bool {
        self.preamble.iter().any(|l| !l.trim().is_empty())
    }
}

/// Split `text` at lines starting with `#`.
pub fn parse_sections(text: &str) -> ParsedDocument {
    let mut doc = ParsedDocument::default();
    let mut current: Option<(usize, String, Vec<String>)> = None;

    for line in text.split('\n') {
        if line.starts_with('#') {
            if let Some((level, title, content)) = current.take() {
                doc.sections.push(Section::new(level, title, content));
            }
            let rest = line.trim_start_matches('#');
            let level = line.len() - rest.len();
            current = Some((level, rest.trim().to_string(), Vec::new()));
        } else if let Some((_, _, content)) = current.as_mut() {
            content.push(line.to_string());
        } else {
            doc.preamble.push(line.to_string());
        }
    }
    if let Some((level, title, content)) = current {
        doc.sections.push(Section::new(level, title, content));
    }
    doc
}
