//! Compression pipeline: parse, dedup, rank, select, reconstruct.

use lane_core::config::CompressionConfig;
use lane_core::estimate_tokens;
use serde::{Deserialize, Serialize};

use crate::dedup::dedupe_sections;
use crate::rank::rank_sections;
use crate::reconstruct::reconstruct;
use crate::section::parse_sections;
use crate::select::{select_sections, SelectPolicy};

/// Compression result with statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedContext {
    pub original_text: String,
    pub compressed_text: String,
    pub original_tokens: usize,
    pub compressed_tokens: usize,
    /// `original_tokens / compressed_tokens`, 1.0 when nothing remains.
    pub compression_ratio: f64,
    pub sections_kept: Vec<String>,
    pub sections_removed: Vec<String>,
    /// Budget consumed by the kept sections at selection time.
    pub kept_tokens: usize,
    /// Text before the first heading was present and not carried over.
    pub preamble_dropped: bool,
}

impl CompressedContext {
    fn unchanged(text: &str, tokens: usize) -> Self {
        Self {
            original_text: text.to_string(),
            compressed_text: text.to_string(),
            original_tokens: tokens,
            compressed_tokens: tokens,
            compression_ratio: 1.0,
            sections_kept: Vec::new(),
            sections_removed: Vec::new(),
            kept_tokens: tokens,
            preamble_dropped: false,
        }
    }

    pub fn was_compressed(&self) -> bool {
        self.compressed_text != self.original_text
    }
}

/// Fits heading-structured text into a token budget.
#[derive(Debug, Clone)]
pub struct ContextCompressor {
    policy: SelectPolicy,
}

impl ContextCompressor {
    /// `target_tokens` must be at least 1.
    pub fn new(target_tokens: usize) -> Self {
        Self {
            policy: SelectPolicy {
                target_tokens,
                ..SelectPolicy::default()
            },
        }
    }

    pub fn from_config(config: &CompressionConfig) -> Self {
        Self {
            policy: SelectPolicy {
                target_tokens: config.target_tokens,
                summarize_max_lines: config.summarize_max_lines,
                summarize_threshold: config.summarize_threshold,
            },
        }
    }

    pub fn with_summarize_max_lines(mut self, lines: usize) -> Self {
        self.policy.summarize_max_lines = lines;
        self
    }

    pub fn target_tokens(&self) -> usize {
        self.policy.target_tokens
    }

    /// Compress `text`. Text already within budget comes back untouched.
    pub fn compress(&self, text: &str, preserve: &[String]) -> CompressedContext {
        let original_tokens = estimate_tokens(text);
        if original_tokens <= self.policy.target_tokens {
            return CompressedContext::unchanged(text, original_tokens);
        }

        let doc = parse_sections(text);
        if doc.sections.is_empty() {
            tracing::debug!(original_tokens, "no headings, returning text unchanged");
            return CompressedContext::unchanged(text, original_tokens);
        }
        let preamble_dropped = doc.has_preamble();
        if preamble_dropped {
            tracing::debug!(lines = doc.preamble.len(), "text before first heading dropped");
        }

        let sections = dedupe_sections(doc.sections);
        let ranked = rank_sections(sections, preserve);
        let selection = select_sections(ranked, &self.policy);
        let compressed_text = reconstruct(&selection.kept);
        let compressed_tokens = estimate_tokens(&compressed_text);
        let compression_ratio = if compressed_tokens > 0 {
            original_tokens as f64 / compressed_tokens as f64
        } else {
            1.0
        };

        tracing::debug!(
            original_tokens,
            compressed_tokens,
            kept = selection.kept.len(),
            removed = selection.removed.len(),
            "context compressed"
        );

        CompressedContext {
            original_text: text.to_string(),
            compressed_text,
            original_tokens,
            compressed_tokens,
            compression_ratio,
            sections_kept: selection.kept.iter().map(|s| s.title.clone()).collect(),
            sections_removed: selection.removed.iter().map(|s| s.title.clone()).collect(),
            kept_tokens: selection.kept_tokens,
            preamble_dropped,
        }
    }
}

impl Default for ContextCompressor {
    fn default() -> Self {
        Self::new(SelectPolicy::default().target_tokens)
    }
}
