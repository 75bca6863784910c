//! Extraction orchestrator: model-first, heuristics as fallback.

use lane_core::{CandidateMemory, Category, LaneConfig};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

use crate::dedup::dedupe_by_score;
use crate::noise::is_code_or_noise;
use crate::quality::{clean_content, ensure_terminal};
use crate::segmenter::{split_sentences, word_count};
use crate::strategies::{default_strategies, ExtractionStrategy};
use crate::summarizer::{MemorySummarizer, DEFAULT_CONFIDENCE};
use crate::transcript::read_assistant_text;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MIN_WORDS: usize = 4;

/// Turns conversational text into deduplicated candidate memories.
pub struct ConversationLearner {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    summarizer: Option<Arc<dyn MemorySummarizer>>,
    pub confidence_threshold: f64,
    pub min_words: usize,
    pub project_name: Option<String>,
}

impl ConversationLearner {
    /// Heuristics only.
    pub fn new() -> Self {
        Self {
            strategies: default_strategies(),
            summarizer: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            min_words: DEFAULT_MIN_WORDS,
            project_name: None,
        }
    }

    pub fn from_config(config: &LaneConfig) -> Self {
        Self {
            confidence_threshold: config.summarizer.confidence_threshold,
            min_words: config.extraction.min_words,
            ..Self::new()
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn MemorySummarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn with_project(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    pub fn has_summarizer(&self) -> bool {
        self.summarizer.is_some()
    }

    /// Extract candidates from free text. Never fails; the worst case is empty.
    pub fn extract_from_text(&self, text: &str, source: &str) -> Vec<CandidateMemory> {
        let from_model = self.extract_with_model(text, source);
        if !from_model.is_empty() {
            tracing::debug!(count = from_model.len(), "model extraction produced candidates");
            return dedupe_by_score(from_model);
        }

        let mut candidates = Vec::new();
        for sentence in split_sentences(text) {
            if word_count(&sentence) < self.min_words || is_code_or_noise(&sentence) {
                continue;
            }
            for strategy in &self.strategies {
                candidates.extend(strategy.extract(&sentence, source));
            }
        }
        let kept = dedupe_by_score(candidates);
        tracing::debug!(count = kept.len(), source, "heuristic extraction finished");
        kept
    }

    fn project(&self) -> String {
        if let Some(name) = &self.project_name {
            return name.clone();
        }
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default()
    }

    fn extract_with_model(&self, text: &str, source: &str) -> Vec<CandidateMemory> {
        let Some(summarizer) = &self.summarizer else {
            return Vec::new();
        };
        let response = match summarizer.summarize(text, &self.project()) {
            Ok(Some(response)) => response,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::debug!(error = %err, "summarizer failed, using heuristics");
                return Vec::new();
            }
        };

        response
            .memory_entries
            .into_iter()
            .filter_map(|entry| {
                let content = entry.content.trim();
                let confidence = if entry.confidence.is_finite() {
                    entry.confidence
                } else {
                    DEFAULT_CONFIDENCE
                };
                if content.is_empty() || confidence < self.confidence_threshold {
                    return None;
                }
                let cleaned = clean_content(&ensure_terminal(content))?;
                let category = Category::from_model_type(&entry.entry_type);
                Some(
                    CandidateMemory::new(cleaned, category, confidence.clamp(0.5, 1.0), source)
                        .with_strategy("llm")
                        .with_meta("llm_type", json!(entry.entry_type))
                        .with_meta("tags", json!(entry.tags)),
                )
            })
            .collect()
    }

    /// Learn from a JSONL session transcript. Missing or unreadable files yield nothing.
    pub fn extract_from_transcript(&self, path: &Path) -> Vec<CandidateMemory> {
        let texts = match read_assistant_text(path) {
            Ok(texts) => texts,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "transcript unreadable");
                return Vec::new();
            }
        };
        if texts.is_empty() {
            return Vec::new();
        }
        dedupe_by_score(self.extract_from_text(&texts.join("\n"), "session_transcript"))
    }
}

impl Default for ConversationLearner {
    fn default() -> Self {
        Self::new()
    }
}
