//! Parsing of model replies.

use lane_core::{CandidateMemory, Category};
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::quality::{clean_content, ensure_terminal};
use crate::summarizer::{ModelEntry, SummaryResponse};

const DEFAULT_RESPONSE_RELEVANCE: f64 = 0.8;
const MAX_SUMMARY_SENTENCES: usize = 4;
const ENTRY_SIGNATURE_CHARS: usize = 80;

fn strip_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        return trimmed.to_string();
    }
    lines.remove(0);
    if lines.last().is_some_and(|l| l.trim().starts_with("```")) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

/// Pull a JSON object out of free-form model output.
pub fn extract_json_object(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    let cleaned = strip_fence(text);
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&cleaned) {
        return Some(value);
    }
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&cleaned[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Summarizer reply: needs `summary` and `memory_entries`.
pub fn parse_summary_output(text: &str) -> Option<SummaryResponse> {
    let payload = extract_json_object(text)?;
    let obj = payload.as_object()?;
    if !obj.contains_key("summary") || !obj.contains_key("memory_entries") {
        return None;
    }

    let summary = match &obj["summary"] {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let memory_entries = obj["memory_entries"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<ModelEntry>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    let suggested_deletions = obj
        .get("suggested_deletions")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    Some(SummaryResponse { summary, memory_entries, suggested_deletions })
}

/// Keep the first `max_sentences` of a `". "`-separated summary.
pub fn trim_summary(summary: &str, max_sentences: usize) -> String {
    let parts: Vec<&str> = summary.split(". ").collect();
    if parts.len() <= max_sentences {
        return summary.to_string();
    }
    let mut trimmed = parts[..max_sentences].join(". ").trim().to_string();
    if !trimmed.ends_with('.') {
        trimmed.push('.');
    }
    trimmed
}

/// Merge per-chunk summaries into one.
pub fn merge_summaries(mut results: Vec<SummaryResponse>) -> Option<SummaryResponse> {
    match results.len() {
        0 => return None,
        1 => return results.pop(),
        _ => {}
    }

    let summary = results
        .iter()
        .map(|r| r.summary.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let summary = trim_summary(summary.trim(), MAX_SUMMARY_SENTENCES);

    let mut seen = HashSet::new();
    let mut memory_entries = Vec::new();
    let mut seen_deletions = HashSet::new();
    let mut suggested_deletions = Vec::new();
    for result in results {
        for entry in result.memory_entries {
            let sig: String = entry
                .content
                .trim()
                .to_lowercase()
                .chars()
                .take(ENTRY_SIGNATURE_CHARS)
                .collect();
            if sig.is_empty() || !seen.insert(sig) {
                continue;
            }
            memory_entries.push(entry);
        }
        for id in result.suggested_deletions {
            if seen_deletions.insert(id.clone()) {
                suggested_deletions.push(id);
            }
        }
    }

    Some(SummaryResponse { summary, memory_entries, suggested_deletions })
}

/// Primary-model reply in the `{"memories": [...]}` schema (or
/// `memory_entries`). Content goes through the same quality gate as
/// heuristic candidates.
pub fn parse_extraction_response(text: &str, source: &str) -> Vec<CandidateMemory> {
    let Some(data) = extract_json_object(text) else {
        return Vec::new();
    };
    let non_empty = |key: &str| {
        data.get(key)
            .and_then(Value::as_array)
            .filter(|a| !a.is_empty())
    };
    let Some(entries) = non_empty("memories").or_else(|| non_empty("memory_entries")) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let raw = entry.get("content").and_then(Value::as_str)?.trim();
            if raw.is_empty() {
                return None;
            }
            let content = clean_content(&ensure_terminal(raw))?;
            let category = entry
                .get("category")
                .and_then(Value::as_str)
                .map(Category::parse_lossy)
                .unwrap_or(Category::Insights);
            let relevance = match entry.get("relevance") {
                Some(Value::Number(n)) => n.as_f64(),
                Some(Value::String(s)) => s.trim().parse().ok(),
                _ => None,
            }
            .filter(|r: &f64| r.is_finite())
            .unwrap_or(DEFAULT_RESPONSE_RELEVANCE)
            .clamp(0.0, 1.0);
            let tags = entry
                .get("tags")
                .filter(|t| t.is_array())
                .cloned()
                .unwrap_or_else(|| json!([]));
            Some(
                CandidateMemory::new(content, category, relevance, source)
                    .with_strategy("claude")
                    .with_meta("tags", tags),
            )
        })
        .collect()
}
