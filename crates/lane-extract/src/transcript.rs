//! Session transcript reading (JSONL, one event per line).

use serde_json::Value;
use std::path::Path;

/// Assistant-authored text blocks from a JSONL transcript. Tool results and
/// user turns are ignored; malformed lines are skipped.
pub fn assistant_text_from_jsonl(raw: &str) -> Vec<String> {
    let mut texts = Vec::new();
    for line in raw.lines().filter(|l| !l.trim().is_empty()) {
        let Ok(entry) = serde_json::from_str::<Value>(line) else {
            continue;
        };
        if entry.get("type").and_then(Value::as_str) != Some("assistant") {
            continue;
        }
        match entry.pointer("/message/content") {
            Some(Value::Array(blocks)) => {
                for block in blocks {
                    if block.get("type").and_then(Value::as_str) != Some("text") {
                        continue;
                    }
                    if let Some(text) = block.get("text").and_then(Value::as_str) {
                        if !text.is_empty() {
                            texts.push(text.to_string());
                        }
                    }
                }
            }
            Some(Value::String(text)) => texts.push(text.clone()),
            _ => {}
        }
    }
    texts
}

pub fn read_assistant_text(path: &Path) -> lane_core::Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(assistant_text_from_jsonl(&raw))
}
