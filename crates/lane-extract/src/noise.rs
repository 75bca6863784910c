//! Noise filter: code, tool output, transcript debris and meta-commentary.

use regex::Regex;
use std::sync::LazyLock;

static RE_LINE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+→").unwrap());
static RE_CODE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(import|from|def|class|function|const|let|var)\s+").unwrap()
});
static RE_TEST_OUTPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"test_\w+::|::\w+test|PASSED\s*\[|FAILED\s*\[|\d+\s*passed.*\d+\s*(?:failed|warning|error)")
        .unwrap()
});
static RE_MEMORY_ID_BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*[a-z]+-\d+\*\*").unwrap());
static RE_MEMORY_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z]{4}-\d{3}\b").unwrap());
static RE_CURATION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^##\s*(Quality Issues|Kept|Summary|Memories|Action|Curation)").unwrap()
});
static RE_RELEVANCE_CITE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(relevance:\s*\d\.\d+\)").unwrap());
static RE_PLANNING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Let me|I'll now|I'm going to|Want me to|Would you like|Here's my approach)").unwrap()
});
static RE_DEBUG_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-\s*(raw code|debug|transcript artifact)").unwrap()
});
static RE_OBSERVATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^I (see|notice|found|can see|observe)").unwrap()
});
static RE_QUALITY_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(low-quality|high-quality)\s+(memories|content|entries)").unwrap()
});
static RE_FILE_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(the file|this file|the memory|memories\.json)\s+(has|have|contains|shows)").unwrap()
});
static RE_PROBLEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(is missing|but not registered|doesn't exist|is not|are missing|but no|need to|should have)")
        .unwrap()
});
static RE_SOLUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(fixed by|solved by|created|added|changed to)").unwrap()
});
static RE_MEMORY_LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*-\s*\*\*[a-z]+-\d+\*\*").unwrap());
static RE_AUX_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#{1,4}\s+(Option|Step|Example|Note|Warning|TODO)").unwrap()
});

/// True when `text` looks like code, tool output or chatter rather than knowledge.
pub fn is_code_or_noise(text: &str) -> bool {
    if RE_LINE_NUMBER.is_match(text) || RE_CODE_DECL.is_match(text) {
        return true;
    }

    // Path dumps.
    if text.matches('/').count() > 3 && !text.contains('\n') {
        return true;
    }

    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return true;
    }

    if RE_TEST_OUTPUT.is_match(text)
        || text.contains("Here's the result of running")
        || text.contains(r#"Links: [{"title""#)
        || text.contains(r#""url":"http"#)
        || text.contains(r#""stop_reason""#)
        || text.contains(r#""stop_se"#)
    {
        return true;
    }

    // Our own curation output must never be learned back.
    if RE_MEMORY_ID_BOLD.is_match(text)
        || RE_MEMORY_ID.is_match(text)
        || RE_CURATION_HEADER.is_match(text)
        || text.contains("⚠️ NEEDS ATTENTION")
        || RE_RELEVANCE_CITE.is_match(text)
        || text.starts_with("Source: tool_error")
        || text.starts_with("Source: session_transcript")
    {
        return true;
    }

    if RE_PLANNING.is_match(text)
        || RE_DEBUG_ITEM.is_match(text)
        || RE_OBSERVATION.is_match(text)
        || RE_QUALITY_META.is_match(text)
        || RE_FILE_META.is_match(text)
    {
        return true;
    }

    // A problem statement only counts when it carries its fix.
    if RE_PROBLEM.is_match(text) && !RE_SOLUTION.is_match(text) {
        return true;
    }

    if RE_MEMORY_LIST_ITEM.is_match(text) || text.contains("```") {
        return true;
    }

    if text.trim_end().ends_with("...") && text.chars().count() < 100 {
        return true;
    }

    RE_AUX_HEADER.is_match(text)
}
