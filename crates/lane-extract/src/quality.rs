//! Quality gate applied to every candidate before it may exist.

use regex::Regex;
use std::sync::LazyLock;

/// Shortest acceptable content, in characters.
pub const MIN_CONTENT_CHARS: usize = 20;
/// Longest content kept before truncating at a sentence boundary.
pub const MAX_CONTENT_CHARS: usize = 200;
/// A truncation boundary must end past this character offset.
const MIN_BOUNDARY_END: usize = 100;
const CODE_FENCE: &str = "```";

static RE_SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[a-zA-Z)\]"']\.(?:\s|$)"#).unwrap());
static RE_TERMINAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[.!?)\]"]$"#).unwrap());
static RE_TECH_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z]+[:.A-Z_]").unwrap());
static RE_MARKDOWN_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\*\-#`]+\s*$").unwrap());

/// Normalize `text` for storage, or `None` when it fails the gate.
pub fn clean_content(text: &str) -> Option<String> {
    if text.contains(CODE_FENCE) {
        return None;
    }
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut cleaned = collapsed.trim_matches(|c| c == '"' || c == '\'').to_string();

    let len = cleaned.chars().count();
    if len < MIN_CONTENT_CHARS {
        return None;
    }

    if len > MAX_CONTENT_CHARS {
        let head: String = cleaned.chars().take(MAX_CONTENT_CHARS).collect();
        let last_end = RE_SENTENCE_END.find_iter(&head).last().map(|m| m.end())?;
        if head[..last_end].chars().count() <= MIN_BOUNDARY_END {
            return None;
        }
        cleaned = head[..last_end].trim_end().to_string();
    }

    if is_complete_thought(&cleaned) {
        Some(cleaned)
    } else {
        None
    }
}

/// Well-formed, finished statement: terminal punctuation, no ellipsis, no
/// mid-sentence lowercase start (technical tokens like `stdio:ignore` excepted).
pub fn is_complete_thought(text: &str) -> bool {
    let text = text.trim();
    let Some(first) = text.chars().next() else {
        return false;
    };
    if !RE_TERMINAL.is_match(text) || text.ends_with("...") {
        return false;
    }
    if first.is_lowercase() && !RE_TECH_TOKEN.is_match(text) {
        return false;
    }
    !RE_MARKDOWN_ONLY.is_match(text)
}

/// Append a full stop when model output lacks terminal punctuation.
pub fn ensure_terminal(content: &str) -> String {
    if RE_TERMINAL.is_match(content) {
        content.to_string()
    } else {
        format!("{content}.")
    }
}
