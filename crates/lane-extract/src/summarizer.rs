//! Model seams: the summarizer consumed by the learner and the raw
//! completion client consumed by the extraction service.

use lane_core::estimate_tokens;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::response::{merge_summaries, parse_summary_output};

pub const DEFAULT_CONFIDENCE: f64 = 0.75;

/// One typed entry proposed by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    #[serde(rename = "type", default)]
    pub entry_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default = "default_confidence", deserialize_with = "lenient_confidence")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
}

impl ModelEntry {
    pub fn new(entry_type: &str, content: &str, confidence: f64) -> Self {
        Self {
            entry_type: entry_type.to_string(),
            content: content.to_string(),
            confidence,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// Structured summary of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub memory_entries: Vec<ModelEntry>,
    #[serde(default)]
    pub suggested_deletions: Vec<String>,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

fn lenient_confidence<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(parsed.filter(|c: &f64| c.is_finite()).unwrap_or(DEFAULT_CONFIDENCE))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_tags<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    })
}

/// Turns raw session text into a structured summary. `Ok(None)` means the
/// model had nothing to offer; the learner treats errors the same way.
pub trait MemorySummarizer: Send + Sync {
    fn summarize(&self, text: &str, project_name: &str) -> anyhow::Result<Option<SummaryResponse>>;
}

/// A single blocking completion call against some model.
pub trait ModelClient: Send + Sync {
    fn complete(&self, system_prompt: &str, user_message: &str) -> anyhow::Result<Option<String>>;
}

pub const SUMMARY_SYSTEM_PROMPT: &str = "\
You extract durable developer knowledge from coding sessions.

Record knowledge, not actions: design decisions and why they were made, \
problems solved with their root cause, reusable patterns, constraints \
discovered and future considerations.

Skip individual commands, incidental file names, code snippets and generic advice.

Respond with JSON only, using the keys summary, memory_entries and \
suggested_deletions. Each memory entry has type (design_decision, \
problem_solved, pattern_established, constraint_discovered, \
future_consideration or dependency_added), content (at most three \
sentences), tags and confidence between 0 and 1.";

/// Word-chunking summarizer over any [`ModelClient`].
pub struct ChunkedSummarizer<C: ModelClient> {
    client: C,
    pub max_input_tokens: usize,
    pub min_session_length: usize,
    pub enabled: bool,
}

impl<C: ModelClient> ChunkedSummarizer<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            max_input_tokens: 4096,
            min_session_length: 0,
            enabled: true,
        }
    }

    pub fn from_config(client: C, config: &lane_core::config::SummarizerConfig) -> Self {
        Self {
            client,
            max_input_tokens: config.max_input_tokens,
            min_session_length: config.min_session_length,
            enabled: config.enabled,
        }
    }

    /// Split on word boundaries once the text exceeds the chunk budget.
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let limit = self.max_input_tokens.saturating_sub(512).max(512);
        if estimate_tokens(text) <= limit {
            return vec![text.to_string()];
        }
        let words_per_chunk = ((limit as f64 / lane_core::tokens::TOKENS_PER_WORD) as usize).max(200);
        let words: Vec<&str> = text.split_whitespace().collect();
        words.chunks(words_per_chunk).map(|c| c.join(" ")).collect()
    }

    fn user_prompt(chunk: &str, project_name: &str) -> String {
        let payload = json!({
            "project_name": project_name,
            "raw_transcript": chunk,
            "context_hints": [],
        });
        let rendered = serde_json::to_string_pretty(&payload).unwrap_or_default();
        format!(
            "Input:\n{rendered}\n\nReturn JSON only with keys: summary, memory_entries, suggested_deletions."
        )
    }
}

impl<C: ModelClient> MemorySummarizer for ChunkedSummarizer<C> {
    fn summarize(&self, text: &str, project_name: &str) -> anyhow::Result<Option<SummaryResponse>> {
        if text.trim().is_empty() || !self.enabled {
            return Ok(None);
        }
        if self.min_session_length > 0 && estimate_tokens(text) < self.min_session_length {
            tracing::debug!(min = self.min_session_length, "session below minimum length");
            return Ok(None);
        }

        let chunks = self.chunk_text(text);
        let mut results = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            let reply = self
                .client
                .complete(SUMMARY_SYSTEM_PROMPT, &Self::user_prompt(chunk, project_name))?;
            match reply.as_deref().and_then(parse_summary_output) {
                Some(parsed) => results.push(parsed),
                None => tracing::debug!(chunk = idx, "model reply was not a usable summary"),
            }
        }
        Ok(merge_summaries(results))
    }
}
