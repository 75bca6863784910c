use crate::dedup::{dedupe_sections, signature};
use crate::pipeline::*;
use crate::rank::{importance, rank_sections};
use crate::reconstruct::reconstruct;
use crate::section::*;
use crate::select::*;

fn lines(title: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{title} detail {i}")).collect()
}

fn doc(sections: &[(&str, usize)]) -> String {
    sections
        .iter()
        .map(|(title, n)| format!("## {title}\n{}", lines(title, *n).join("\n")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn four_sections() -> String {
    doc(&[("Authentication", 4), ("Database", 4), ("Testing", 4), ("Deployment", 4)])
}

fn none() -> Vec<String> {
    Vec::new()
}

// ========== Parser ==========

#[test]
fn test_parse_levels_and_titles() {
    let parsed = parse_sections("# Top\nintro\n## Sub\n### Deep  \nbody");
    let heads: Vec<_> = parsed.sections.iter().map(|s| (s.level, s.title.as_str())).collect();
    assert_eq!(heads, vec![(1, "Top"), (2, "Sub"), (3, "Deep")]);
    assert_eq!(parsed.sections[0].content(), &["intro".to_string()]);
    assert!(parsed.sections[1].content().is_empty());
    assert!(!parsed.has_preamble());
}

#[test]
fn test_parse_tokens_per_section() {
    let parsed = parse_sections(&four_sections());
    assert_eq!(parsed.sections.len(), 4);
    // 12 words * 1.3 = 15.6
    assert!(parsed.sections.iter().all(|s| s.tokens() == 16));
}

#[test]
fn test_parse_preamble_reported() {
    let parsed = parse_sections("loose intro text\n# Heading\nbody line");
    assert_eq!(parsed.sections.len(), 1);
    assert!(parsed.has_preamble());
    assert_eq!(parsed.preamble, vec!["loose intro text".to_string()]);
}

#[test]
fn test_parse_no_headings() {
    let parsed = parse_sections("just text\nmore text");
    assert!(parsed.sections.is_empty());
}

#[test]
fn test_headingless_over_budget_text_unchanged() {
    let text = "We chose Unix sockets over HTTP for lower latency. ".repeat(20);
    let out = ContextCompressor::new(10).compress(&text, &none());
    assert_eq!(out.compressed_text, text);
    assert_eq!(out.compression_ratio, 1.0);
    assert!(!out.was_compressed());
    assert!(out.sections_removed.is_empty());
    assert!(!out.preamble_dropped);
}

#[test]
fn test_summarized_recomputes_tokens() {
    let section = Section::new(2, "API", lines("API", 10));
    assert_eq!(section.tokens(), 39);
    let short = section.summarized(3);
    assert_eq!(short.content().len(), 4);
    assert_eq!(short.content()[3], "... (7 more lines)");
    assert_eq!(short.tokens(), 17);

    let tiny = Section::new(1, "T", lines("T", 2)).summarized(3);
    assert_eq!(tiny.content().len(), 2);
}

// ========== Dedup ==========

#[test]
fn test_section_signature() {
    assert_eq!(signature("  Hello\n\tWORLD  "), "hello world");
    assert_eq!(signature(&"x".repeat(300)).len(), 100);
}

#[test]
fn test_dedupe_first_wins() {
    let a = Section::new(2, "First", vec!["Same body text".into()]);
    let b = Section::new(2, "Second", vec!["same   BODY text".into()]);
    let c = Section::new(2, "Third", vec!["Other".into()]);
    let out = dedupe_sections(vec![a, b, c]);
    let titles: Vec<_> = out.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Third"]);
}

// ========== Ranking ==========

#[test]
fn test_importance_components() {
    let plain = Section::new(2, "Testing", lines("Testing", 4));
    assert!((importance(&plain, &none()) - 0.5).abs() < 1e-9);

    let preserved = importance(&plain, &["Testing".to_string()]);
    assert!((preserved - 1.5).abs() < 1e-9);

    let keywords = Section::new(2, "API Error Notes", lines("x", 4));
    assert!((importance(&keywords, &none()) - 1.4).abs() < 1e-9);

    let code = Section::new(2, "Misc", vec!["def handler(request) returns a response object".into(), "x y z".into()]);
    assert!((importance(&code, &none()) - 0.7).abs() < 1e-9);

    let short = Section::new(2, "Misc", vec!["tiny".into()]);
    assert!((importance(&short, &none()) - 0.3).abs() < 1e-9);

    let long = Section::new(2, "Misc", vec!["word ".repeat(400)]);
    assert!((importance(&long, &none()) - 0.4).abs() < 1e-9);
}

#[test]
fn test_rank_sorted_and_stable() {
    let parsed = parse_sections(&four_sections());
    let ranked = rank_sections(parsed.sections, &none());
    let titles: Vec<_> = ranked.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Authentication", "Database", "Deployment", "Testing"]);
    assert!(ranked.iter().all(|s| s.importance_score.is_some()));
}

// ========== Selection ==========

fn ranked(text: &str, preserve: &[String]) -> Vec<Section> {
    rank_sections(parse_sections(text).sections, preserve)
}

#[test]
fn test_select_greedy() {
    let policy = SelectPolicy { target_tokens: 35, ..Default::default() };
    let sel = select_sections(ranked(&four_sections(), &none()), &policy);
    let kept: Vec<_> = sel.kept.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(kept, vec!["Authentication", "Database"]);
    assert_eq!(sel.kept_tokens, 32);
    assert_eq!(sel.removed.len(), 2);
}

#[test]
fn test_select_summarizes_important_section() {
    let policy = SelectPolicy { target_tokens: 30, ..Default::default() };
    let sel = select_sections(ranked(&doc(&[("API", 10)]), &none()), &policy);
    assert_eq!(sel.kept.len(), 1);
    assert_eq!(sel.kept[0].content().last().map(String::as_str), Some("... (7 more lines)"));
    assert_eq!(sel.kept_tokens, 17);
    assert!(sel.removed.is_empty());
}

#[test]
fn test_select_low_score_not_summarized() {
    let policy = SelectPolicy { target_tokens: 30, ..Default::default() };
    let sel = select_sections(ranked(&doc(&[("Misc", 10)]), &none()), &policy);
    assert!(sel.kept.is_empty());
    assert_eq!(sel.removed.len(), 1);
}

#[test]
fn test_select_never_exceeds_budget() {
    let text = doc(&[("API", 10), ("Authentication", 4), ("Notes", 7), ("Misc", 2), ("Database", 12)]);
    for target in 1..120 {
        let policy = SelectPolicy { target_tokens: target, ..Default::default() };
        let sel = select_sections(ranked(&text, &none()), &policy);
        let sum: usize = sel.kept.iter().map(|s| s.tokens()).sum();
        assert_eq!(sum, sel.kept_tokens);
        assert!(sum <= target, "target {target} exceeded: {sum}");
    }
}

// ========== Reconstruct ==========

#[test]
fn test_reconstruct_format() {
    let sections = vec![
        Section::new(1, "A", vec!["line".into()]),
        Section::new(3, "B", Vec::new()),
    ];
    assert_eq!(reconstruct(&sections), "# A\n\nline\n\n### B\n\n");
    assert_eq!(reconstruct(&[]), "");
}

// ========== Pipeline ==========

#[test]
fn test_short_circuit_returns_input() {
    let text = "# Small\n\nfits easily";
    let out = ContextCompressor::new(100).compress(text, &none());
    assert_eq!(out.compressed_text, text);
    assert_eq!(out.compression_ratio, 1.0);
    assert!(out.sections_kept.is_empty());
    assert!(out.sections_removed.is_empty());
    assert!(!out.was_compressed());
}

#[test]
fn test_four_sections_tight_budget() {
    let out = ContextCompressor::new(20).compress(&four_sections(), &none());
    assert!(!out.sections_kept.is_empty());
    assert!(!out.sections_removed.is_empty());
    assert!(out.kept_tokens <= 20);
    assert_eq!(out.sections_kept, vec!["Authentication"]);
    assert_eq!(out.original_tokens, 73);
    assert!(out.compression_ratio > 1.0);
    assert!(out.compressed_text.starts_with("## Authentication\n\n"));
}

#[test]
fn test_tiny_budget_is_valid() {
    let out = ContextCompressor::new(1).compress("# Header\n\nSome content here", &none());
    assert!(out.sections_kept.is_empty());
    assert_eq!(out.sections_removed, vec!["Header"]);
    assert_eq!(out.compressed_text, "");
    assert_eq!(out.compressed_tokens, 0);
    assert_eq!(out.compression_ratio, 1.0);
}

#[test]
fn test_preserve_wins_budget() {
    let out = ContextCompressor::new(20).compress(&four_sections(), &["Testing".to_string()]);
    assert_eq!(out.sections_kept, vec!["Testing"]);
}

#[test]
fn test_preamble_flagged() {
    let text = format!("This intro has no heading at all.\n{}", four_sections());
    let out = ContextCompressor::new(20).compress(&text, &none());
    assert!(out.preamble_dropped);
    assert!(!out.compressed_text.contains("intro"));
}

#[test]
fn test_from_config() {
    let mut cfg = lane_core::config::CompressionConfig::default();
    cfg.target_tokens = 30;
    cfg.summarize_max_lines = 1;
    let out = ContextCompressor::from_config(&cfg).compress(&doc(&[("API", 10)]), &none());
    assert!(out.compressed_text.contains("... (9 more lines)"));
}

#[test]
fn test_result_serializes_for_reporting() {
    let out = ContextCompressor::new(20).compress(&four_sections(), &none());
    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["sections_kept"], serde_json::json!(out.sections_kept));
    let back: CompressedContext = serde_json::from_value(value).unwrap();
    assert_eq!(back.compressed_text, out.compressed_text);
    assert_eq!(back.sections_removed, out.sections_removed);
}
