use std::collections::{HashMap, HashSet};
use std::fs;

use lane_core::{CandidateMemory, Category, LaneError};
use lane_storage::{is_contained_duplicate, MemoryStore};
use serde_json::json;
use tempfile::TempDir;

fn store_in(tmp: &TempDir) -> MemoryStore {
    MemoryStore::new(tmp.path().join(".memorylane").join("memories.json"))
}

fn add(store: &MemoryStore, category: Category, content: &str, score: f64) -> String {
    store
        .add_memory(category, content, "manual", score, HashMap::new())
        .unwrap()
}

// ========== Load / save ==========

#[test]
fn test_load_missing_file_gives_empty_document() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let doc = store.load().unwrap();
    assert!(doc.memory_id.starts_with("memorylane-"));
    assert_eq!(doc.version, "0.1.0");
    assert!(doc.categories.is_empty());
    assert_eq!(doc.metadata.total_memories, 0);
    assert!(!store.path().exists());
}

#[test]
fn test_save_creates_parent_and_leaves_no_temp_file() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    add(&store, Category::Context, "Project uses PostgreSQL 15 in production", 0.8);
    assert!(store.path().exists());
    assert!(!store.path().with_extension("tmp").exists());

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert!(raw["categories"]["context"].is_array());
    assert_eq!(raw["categories"]["context"][0]["id"], json!("cont-001"));
    assert_eq!(raw["metadata"]["total_memories"], json!(1));
}

#[test]
fn test_corrupt_file_is_moved_aside() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(store.path(), "{not json").unwrap();

    let doc = store.load().unwrap();
    assert!(doc.categories.is_empty());
    assert!(!store.path().exists());

    let backups: Vec<String> = fs::read_dir(store.path().parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("memories.corrupted.") && n.ends_with(".bak"))
        .collect();
    assert_eq!(backups.len(), 1);
}

/// A file as the earlier tool wrote it: naive local timestamps, null
/// `last_compression` and `last_used`.
const LEGACY_FILE: &str = r#"{
  "memory_id": "memorylane-20251020",
  "created_at": "2025-10-20T09:15:02.481553",
  "last_updated": "2025-10-21T17:40:55.002117",
  "version": "0.1.0",
  "categories": {
    "patterns": [
      {
        "id": "patt-001",
        "content": "API handlers live in src/api and share one auth guard",
        "category": "patterns",
        "source": "manual",
        "timestamp": "2025-10-20T09:15:02.481907",
        "relevance_score": 0.9,
        "usage_count": 2,
        "last_used": "2025-10-21T17:40:55.001874",
        "metadata": {}
      }
    ],
    "insights": [],
    "learnings": [],
    "context": []
  },
  "metadata": {
    "total_memories": 1,
    "total_retrievals": 2,
    "last_compression": null,
    "avg_relevance": 0.0
  }
}"#;

#[test]
fn test_loads_legacy_naive_timestamps() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(store.path(), LEGACY_FILE).unwrap();

    let doc = store.load().unwrap();
    assert_eq!(doc.memory_id, "memorylane-20251020");
    assert_eq!(doc.categories.patterns.len(), 1);
    assert_eq!(doc.categories.patterns[0].usage_count, 2);
    assert!(doc.categories.patterns[0].last_used.is_some());
    assert!(doc.metadata.last_compression.is_none());
    assert!(store.path().exists());

    assert_eq!(add(&store, Category::Patterns, "Second pattern note", 0.7), "patt-002");
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.categories.patterns.len(), 2);
    assert_eq!(reloaded.metadata.total_memories, 2);
}

// ========== Add / query ==========

#[test]
fn test_add_memory_assigns_sequential_ids_per_category() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    assert_eq!(add(&store, Category::Patterns, "Use the repository pattern", 0.9), "patt-001");
    assert_eq!(add(&store, Category::Patterns, "Handlers live in src/api", 0.7), "patt-002");
    assert_eq!(add(&store, Category::Insights, "Caching halves latency", 0.8), "insi-001");
    assert_eq!(add(&store, Category::Learnings, "Mocks hid a bug", 0.8), "lear-001");
    assert_eq!(store.load().unwrap().metadata.total_memories, 4);
}

#[test]
fn test_add_memory_skips_taken_ids_after_prune() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    add(&store, Category::Context, "low value note one", 0.1);
    add(&store, Category::Context, "high value note two", 0.9);
    assert_eq!(store.prune_low_relevance(0.3, 30).unwrap(), 1);
    // one left (cont-002), so the count-based id would collide
    assert_eq!(add(&store, Category::Context, "another note", 0.9), "cont-003");
}

#[test]
fn test_get_memories_filters_sorts_and_limits() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    add(&store, Category::Patterns, "pattern low", 0.4);
    add(&store, Category::Insights, "insight high", 0.95);
    add(&store, Category::Patterns, "pattern mid", 0.7);

    let all = store.get_memories(None, 0.0, None).unwrap();
    let contents: Vec<&str> = all.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["insight high", "pattern mid", "pattern low"]);

    let patterns = store.get_memories(Some(Category::Patterns), 0.5, None).unwrap();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].content, "pattern mid");

    assert_eq!(store.get_memories(None, 0.0, Some(2)).unwrap().len(), 2);
    assert_eq!(store.get_memories(None, 0.0, Some(0)).unwrap().len(), 3);
}

#[test]
fn test_update_memory_usage() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let id = add(&store, Category::Insights, "Caching halves latency", 0.8);
    store.update_memory_usage(&id).unwrap();
    store.update_memory_usage(&id).unwrap();

    let doc = store.load().unwrap();
    let memory = &doc.categories.insights[0];
    assert_eq!(memory.usage_count, 2);
    assert!(memory.last_used.is_some());
    assert_eq!(doc.metadata.total_retrievals, 2);
}

#[test]
fn test_update_unknown_memory_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let err = store.update_memory_usage("patt-999").unwrap_err();
    assert!(matches!(err, LaneError::MemoryNotFound { ref id } if id == "patt-999"));
}

#[test]
fn test_prune_keeps_relevant_and_recently_used() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    add(&store, Category::Patterns, "strong pattern", 0.9);
    add(&store, Category::Patterns, "weak unused pattern", 0.1);
    let used = add(&store, Category::Learnings, "weak but used learning", 0.2);
    store.update_memory_usage(&used).unwrap();

    assert_eq!(store.prune_low_relevance(0.3, 30).unwrap(), 1);
    let doc = store.load().unwrap();
    assert_eq!(doc.metadata.total_memories, 2);
    assert_eq!(doc.categories.patterns.len(), 1);
    assert_eq!(doc.categories.learnings.len(), 1);
}

// ========== Curation support ==========

#[test]
fn test_get_memory_by_id() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let id = add(&store, Category::Insights, "Batch writes cut fsync overhead", 0.7);
    let found = store.get_memory_by_id(&id).unwrap().unwrap();
    assert_eq!(found.content, "Batch writes cut fsync overhead");
    assert!(store.get_memory_by_id("insi-999").unwrap().is_none());
}

#[test]
fn test_delete_memory() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let id = add(&store, Category::Learnings, "Pin the toolchain in CI", 0.8);
    add(&store, Category::Learnings, "Cache cargo registry between jobs", 0.8);

    assert!(store.delete_memory(&id).unwrap());
    assert!(!store.delete_memory(&id).unwrap());
    let doc = store.load().unwrap();
    assert_eq!(doc.categories.len(), 1);
    assert_eq!(doc.metadata.total_memories, 1);
}

#[test]
fn test_update_memory_content_and_relevance() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let id = add(&store, Category::Patterns, "Use anyhow in binaries", 0.6);

    assert!(store.update_memory(&id, Some("Use anyhow in binaries only"), None).unwrap());
    assert!(store.update_memory(&id, None, Some(0.9)).unwrap());
    let memory = store.get_memory_by_id(&id).unwrap().unwrap();
    assert_eq!(memory.content, "Use anyhow in binaries only");
    assert_eq!(memory.relevance_score, 0.9);

    assert!(!store.update_memory("patt-404", Some("x"), None).unwrap());
}

#[test]
fn test_get_uncurated_memories() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let first = add(&store, Category::Context, "Service runs on port 8443", 0.5);
    let second = add(&store, Category::Patterns, "Handlers return Result", 0.9);
    let third = add(&store, Category::Insights, "Cold starts dominate p99", 0.7);

    let all = store.get_uncurated_memories(&HashSet::new(), 10).unwrap();
    let ids: Vec<&str> = all.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str(), third.as_str()]);

    let reviewed: HashSet<String> = [first.clone(), third].into_iter().collect();
    let pending = store.get_uncurated_memories(&reviewed, 10).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second);

    assert_eq!(store.get_uncurated_memories(&HashSet::new(), 1).unwrap()[0].id, first);
}

// ========== Rendering / stats ==========

#[test]
fn test_to_markdown_layout() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    add(&store, Category::Insights, "Y", 0.6);
    add(&store, Category::Patterns, "Use X", 1.0);

    let md = store.to_markdown(None).unwrap();
    assert_eq!(
        md,
        "# MemoryLane Context\n\n## Patterns\n\n- Use X ⭐⭐⭐⭐⭐\n\n## Insights\n\n- Y ⭐⭐⭐\n"
    );
    let only = store.to_markdown(Some(Category::Insights)).unwrap();
    assert_eq!(only, "# MemoryLane Context\n\n## Insights\n\n- Y ⭐⭐⭐\n");
}

#[test]
fn test_to_markdown_empty_store() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    assert_eq!(store.to_markdown(None).unwrap(), "# MemoryLane Context\n");
}

#[test]
fn test_stats() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    add(&store, Category::Patterns, "a pattern", 0.9);
    let id = add(&store, Category::Patterns, "b pattern", 0.6);
    store.update_memory_usage(&id).unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.total_memories, 2);
    assert_eq!(stats.total_retrievals, 1);
    assert_eq!(stats.categories.len(), 4);
    let patterns = stats.category(Category::Patterns).unwrap();
    assert_eq!(patterns.count, 2);
    assert!((patterns.avg_relevance - 0.75).abs() < 1e-9);
    assert_eq!(patterns.total_usage, 1);
    let context = stats.category(Category::Context).unwrap();
    assert_eq!(context.count, 0);
    assert_eq!(context.avg_relevance, 0.0);
}

// ========== Backups ==========

#[test]
fn test_export_and_import_backup() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp).with_backup_dir(tmp.path().join("backups"));
    add(&store, Category::Context, "first memory kept in backup", 0.8);

    let snapshot = tmp.path().join("snapshot.json");
    assert_eq!(store.export_backup(Some(snapshot.as_path())).unwrap(), snapshot);

    add(&store, Category::Context, "second memory added later", 0.8);
    assert_eq!(store.load().unwrap().categories.len(), 2);

    let safety = store.import_backup(&snapshot).unwrap();
    assert!(safety.starts_with(tmp.path().join("backups")));
    assert!(safety.exists());
    let doc = store.load().unwrap();
    assert_eq!(doc.categories.len(), 1);
    assert_eq!(doc.categories.context[0].content, "first memory kept in backup");
}

#[test]
fn test_import_missing_backup_fails() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    assert!(store.import_backup(&tmp.path().join("nope.json")).is_err());
}

// ========== Ingest / recall ==========

#[test]
fn test_containment_duplicate() {
    let stored = "Use the repository pattern for all database access in this project";
    let candidate = "We decided: use the repository pattern for all database access in this project.";
    assert!(is_contained_duplicate(stored, candidate));
    assert!(is_contained_duplicate(candidate, stored));
    assert!(!is_contained_duplicate(stored, "Deploy with blue-green releases on Fridays only"));
    assert!(!is_contained_duplicate("", stored));
}

#[test]
fn test_ingest_skips_containment_duplicates() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    add(
        &store,
        Category::Patterns,
        "Use the repository pattern for all database access in this project",
        0.9,
    );

    let candidates = vec![
        CandidateMemory::new(
            "We decided: use the repository pattern for all database access in this project.",
            Category::Patterns,
            0.8,
            "session",
        ),
        CandidateMemory::new(
            "Deploy with blue-green releases to avoid downtime.",
            Category::Context,
            0.85,
            "session",
        )
        .with_strategy("template")
        .with_meta("tags", json!(["deploy"])),
        CandidateMemory::new(
            "Deploy with blue-green releases to avoid downtime.",
            Category::Context,
            0.85,
            "session",
        ),
    ];
    let report = store.ingest(&candidates).unwrap();
    assert_eq!(report.added, vec!["cont-001".to_string()]);
    assert_eq!(report.skipped, 2);

    let doc = store.load().unwrap();
    assert_eq!(doc.metadata.total_memories, 2);
    let stored = &doc.categories.context[0];
    assert_eq!(stored.source, "session");
    assert_eq!(stored.metadata["strategy"], json!("template"));
    assert_eq!(stored.metadata["tags"], json!(["deploy"]));
}

#[test]
fn test_recall_is_case_insensitive() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    add(&store, Category::Context, "Project uses PostgreSQL 15", 0.6);
    add(&store, Category::Learnings, "postgresql vacuum needs tuning", 0.9);
    add(&store, Category::Patterns, "Handlers live in src/api", 0.9);

    let hits = store.recall("POSTGRESQL", 10).unwrap();
    let contents: Vec<&str> = hits.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        vec!["postgresql vacuum needs tuning", "Project uses PostgreSQL 15"]
    );
    assert_eq!(store.recall("postgresql", 1).unwrap().len(), 1);
    assert!(store.recall("redis", 10).unwrap().is_empty());
}
