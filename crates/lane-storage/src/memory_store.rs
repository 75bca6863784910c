//! JSON-file memory store.
//!
//! Every operation re-reads the file, applies its change and writes it
//! back. Writes are atomic but unlocked: two processes updating the same
//! file at the same moment can lose one of the updates.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use lane_core::config::LaneConfig;
use lane_core::{CandidateMemory, Category, LaneError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

pub const STORE_VERSION: &str = "0.1.0";

/// Characters of normalized content compared by [`is_contained_duplicate`].
pub const CONTAINMENT_PREFIX_CHARS: usize = 50;

// ========== Timestamps ==========

/// RFC 3339, or a naive ISO-8601 stamp taken as local time (the format
/// older memory files were written in).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive: NaiveDateTime = raw.parse().ok()?;
    Some(
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc()),
    )
}

pub(crate) fn lenient_time<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(d)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub(crate) fn lenient_time_opt<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

// ========== Document model ==========

/// One persisted memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub content: String,
    pub category: Category,
    pub source: String,
    #[serde(deserialize_with = "lenient_time")]
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_relevance")]
    pub relevance_score: f64,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default, deserialize_with = "lenient_time_opt")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

fn default_relevance() -> f64 {
    1.0
}

/// The four category lists, serialized as an object keyed by category name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Categories {
    pub patterns: Vec<Memory>,
    pub insights: Vec<Memory>,
    pub learnings: Vec<Memory>,
    pub context: Vec<Memory>,
}

impl Categories {
    pub fn get(&self, category: Category) -> &[Memory] {
        match category {
            Category::Patterns => &self.patterns,
            Category::Insights => &self.insights,
            Category::Learnings => &self.learnings,
            Category::Context => &self.context,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Vec<Memory> {
        match category {
            Category::Patterns => &mut self.patterns,
            Category::Insights => &mut self.insights,
            Category::Learnings => &mut self.learnings,
            Category::Context => &mut self.context,
        }
    }

    /// All memories in category order.
    pub fn iter(&self) -> impl Iterator<Item = &Memory> {
        Category::ALL.into_iter().flat_map(move |c| self.get(c).iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Memory> {
        self.patterns
            .iter_mut()
            .chain(self.insights.iter_mut())
            .chain(self.learnings.iter_mut())
            .chain(self.context.iter_mut())
    }

    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|&c| self.get(c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreMetadata {
    pub total_memories: usize,
    pub total_retrievals: u64,
    #[serde(deserialize_with = "lenient_time_opt")]
    pub last_compression: Option<DateTime<Utc>>,
    pub avg_relevance: f64,
}

/// The whole on-disk document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub memory_id: String,
    #[serde(deserialize_with = "lenient_time")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "lenient_time")]
    pub last_updated: DateTime<Utc>,
    pub version: String,
    #[serde(default)]
    pub categories: Categories,
    #[serde(default)]
    pub metadata: StoreMetadata,
}

impl MemoryDocument {
    pub fn empty() -> Self {
        let now = Utc::now();
        Self {
            memory_id: format!("memorylane-{}", Local::now().format("%Y%m%d")),
            created_at: now,
            last_updated: now,
            version: STORE_VERSION.to_string(),
            categories: Categories::default(),
            metadata: StoreMetadata::default(),
        }
    }

    fn refresh_avg_relevance(&mut self) {
        let count = self.categories.len();
        self.metadata.avg_relevance = if count == 0 {
            0.0
        } else {
            self.categories.iter().map(|m| m.relevance_score).sum::<f64>() / count as f64
        };
    }

    /// Next free `<prefix>-NNN` id in `category`.
    fn next_id(&self, category: Category) -> String {
        let prefix: String = category.as_str().chars().take(4).collect();
        let existing = self.categories.get(category);
        let mut n = existing.len() + 1;
        loop {
            let id = format!("{prefix}-{n:03}");
            if !existing.iter().any(|m| m.id == id) {
                return id;
            }
            n += 1;
        }
    }

    fn push(
        &mut self,
        category: Category,
        content: String,
        source: String,
        relevance_score: f64,
        metadata: HashMap<String, serde_json::Value>,
    ) -> String {
        let id = self.next_id(category);
        self.categories.get_mut(category).push(Memory {
            id: id.clone(),
            content,
            category,
            source,
            timestamp: Utc::now(),
            relevance_score,
            usage_count: 0,
            last_used: None,
            metadata,
        });
        self.metadata.total_memories += 1;
        id
    }
}

// ========== Reports ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: Category,
    pub count: usize,
    /// Rounded to two decimals.
    pub avg_relevance: f64,
    pub total_usage: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_memories: usize,
    pub total_retrievals: u64,
    pub categories: Vec<CategoryStats>,
}

impl StoreStats {
    pub fn category(&self, category: Category) -> Option<&CategoryStats> {
        self.categories.iter().find(|s| s.category == category)
    }
}

/// Outcome of [`MemoryStore::ingest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub added: Vec<String>,
    pub skipped: usize,
}

// ========== Containment dedup ==========

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True when the normalized 50-char prefix of either text occurs inside the other.
pub fn is_contained_duplicate(a: &str, b: &str) -> bool {
    let na = normalize(a);
    let nb = normalize(b);
    if na.is_empty() || nb.is_empty() {
        return false;
    }
    let pa: String = na.chars().take(CONTAINMENT_PREFIX_CHARS).collect();
    let pb: String = nb.chars().take(CONTAINMENT_PREFIX_CHARS).collect();
    nb.contains(&pa) || na.contains(&pb)
}

// ========== Store ==========

/// Persistent memory store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    path: PathBuf,
    backup_dir: PathBuf,
}

impl MemoryStore {
    /// Backups go to a `backups` directory next to the file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let backup_dir = path
            .parent()
            .map(|p| p.join("backups"))
            .unwrap_or_else(|| PathBuf::from("backups"));
        Self { path, backup_dir }
    }

    pub fn from_config(config: &LaneConfig) -> Self {
        Self {
            path: config.paths.memories_file.clone(),
            backup_dir: config.paths.backup_dir.clone(),
        }
    }

    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file yields an empty document. An unparsable file is moved
    /// aside as `memories.corrupted.<ts>.bak` and an empty document returned.
    pub fn load(&self) -> Result<MemoryDocument> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MemoryDocument::empty()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                let backup = self.backup_corrupted()?;
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "corrupted memory file moved aside"
                );
                Ok(MemoryDocument::empty())
            }
        }
    }

    /// Stamps `last_updated` and writes through a temp file and rename.
    pub fn save(&self, doc: &mut MemoryDocument) -> Result<()> {
        doc.last_updated = Utc::now();
        doc.refresh_avg_relevance();
        let json = serde_json::to_string_pretty(doc)?;
        write_atomic(&self.path, json.as_bytes())
    }

    fn backup_corrupted(&self) -> Result<PathBuf> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let backup = dir.join(format!(
            "memories.corrupted.{}.bak",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        fs::rename(&self.path, &backup).map_err(|e| {
            LaneError::Storage(format!("rename {}: {e}", self.path.display()))
        })?;
        Ok(backup)
    }

    pub fn add_memory(
        &self,
        category: Category,
        content: &str,
        source: &str,
        relevance_score: f64,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<String> {
        let mut doc = self.load()?;
        let id = doc.push(
            category,
            content.to_string(),
            source.to_string(),
            relevance_score,
            metadata,
        );
        self.save(&mut doc)?;
        debug!(id = %id, category = %category, "memory added");
        Ok(id)
    }

    /// Memories at or above `min_relevance`, highest first. A limit of
    /// `None` or `Some(0)` returns everything.
    pub fn get_memories(
        &self,
        category: Option<Category>,
        min_relevance: f64,
        limit: Option<usize>,
    ) -> Result<Vec<Memory>> {
        let doc = self.load()?;
        let mut out: Vec<Memory> = match category {
            Some(c) => doc.categories.get(c).to_vec(),
            None => doc.categories.iter().cloned().collect(),
        };
        out.retain(|m| m.relevance_score >= min_relevance);
        sort_by_relevance(&mut out);
        if let Some(n) = limit.filter(|&n| n > 0) {
            out.truncate(n);
        }
        Ok(out)
    }

    pub fn update_memory_usage(&self, memory_id: &str) -> Result<()> {
        let mut doc = self.load()?;
        let found = Category::ALL.into_iter().find_map(|c| {
            doc.categories
                .get(c)
                .iter()
                .position(|m| m.id == memory_id)
                .map(|i| (c, i))
        });
        let Some((category, index)) = found else {
            return Err(LaneError::MemoryNotFound {
                id: memory_id.to_string(),
            });
        };
        let memory = &mut doc.categories.get_mut(category)[index];
        memory.usage_count += 1;
        memory.last_used = Some(Utc::now());
        doc.metadata.total_retrievals += 1;
        self.save(&mut doc)
    }

    /// Drops memories below `threshold` that were not used within
    /// `max_age_days`. Returns how many were removed.
    pub fn prune_low_relevance(&self, threshold: f64, max_age_days: i64) -> Result<usize> {
        let mut doc = self.load()?;
        let cutoff = Duration::try_days(max_age_days)
            .and_then(|d| Utc::now().checked_sub_signed(d));
        let mut pruned = 0;
        for category in Category::ALL {
            let list = doc.categories.get_mut(category);
            let before = list.len();
            list.retain(|m| {
                m.relevance_score >= threshold
                    || m.last_used.is_some_and(|t| cutoff.map_or(true, |c| t > c))
            });
            pruned += before - list.len();
        }
        doc.metadata.total_memories = doc.metadata.total_memories.saturating_sub(pruned);
        self.save(&mut doc)?;
        info!(pruned, threshold, max_age_days, "pruned low-relevance memories");
        Ok(pruned)
    }

    /// Markdown rendering used for context injection.
    pub fn to_markdown(&self, category: Option<Category>) -> Result<String> {
        let doc = self.load()?;
        Ok(render_markdown(&doc, category))
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let doc = self.load()?;
        let categories = Category::ALL
            .into_iter()
            .map(|category| {
                let list = doc.categories.get(category);
                let avg = if list.is_empty() {
                    0.0
                } else {
                    list.iter().map(|m| m.relevance_score).sum::<f64>() / list.len() as f64
                };
                CategoryStats {
                    category,
                    count: list.len(),
                    avg_relevance: (avg * 100.0).round() / 100.0,
                    total_usage: list.iter().map(|m| m.usage_count).sum(),
                }
            })
            .collect();
        Ok(StoreStats {
            total_memories: doc.metadata.total_memories,
            total_retrievals: doc.metadata.total_retrievals,
            categories,
        })
    }

    /// Writes the current document to `target`, or to
    /// `<backup_dir>/memories.<ts>.json`.
    pub fn export_backup(&self, target: Option<&Path>) -> Result<PathBuf> {
        let doc = self.load()?;
        let path = match target {
            Some(p) => p.to_path_buf(),
            None => self.backup_dir.join(format!(
                "memories.{}.json",
                Local::now().format("%Y%m%d_%H%M%S")
            )),
        };
        let json = serde_json::to_string_pretty(&doc)?;
        write_atomic(&path, json.as_bytes())?;
        info!(path = %path.display(), "memory backup written");
        Ok(path)
    }

    /// Replaces the store with `source`, exporting the current state first.
    /// Returns the path of that safety backup.
    pub fn import_backup(&self, source: &Path) -> Result<PathBuf> {
        let raw = fs::read_to_string(source)
            .with_context(|| format!("read backup {}", source.display()))?;
        let mut doc: MemoryDocument = serde_json::from_str(&raw)?;
        let safety = self.export_backup(None)?;
        self.save(&mut doc)?;
        info!(from = %source.display(), safety = %safety.display(), "memory backup restored");
        Ok(safety)
    }

    /// Persists candidates that are not containment duplicates of stored
    /// memories or of earlier candidates in the same batch.
    pub fn ingest(&self, candidates: &[CandidateMemory]) -> Result<IngestReport> {
        let mut doc = self.load()?;
        let mut report = IngestReport::default();
        for candidate in candidates {
            let duplicate = candidate.content.trim().is_empty()
                || doc
                    .categories
                    .iter()
                    .any(|m| is_contained_duplicate(&m.content, &candidate.content));
            if duplicate {
                report.skipped += 1;
                continue;
            }
            let mut metadata = candidate.metadata.clone();
            metadata.insert(
                "strategy".to_string(),
                serde_json::Value::String(candidate.strategy.clone()),
            );
            let id = doc.push(
                candidate.category,
                candidate.content.clone(),
                candidate.source.clone(),
                candidate.relevance_score,
                metadata,
            );
            report.added.push(id);
        }
        if !report.added.is_empty() {
            self.save(&mut doc)?;
        }
        debug!(added = report.added.len(), skipped = report.skipped, "candidates ingested");
        Ok(report)
    }

    /// Case-insensitive substring search, highest relevance first.
    pub fn recall(&self, query: &str, limit: usize) -> Result<Vec<Memory>> {
        let doc = self.load()?;
        let needle = query.trim().to_lowercase();
        let mut hits: Vec<Memory> = doc
            .categories
            .iter()
            .filter(|m| m.content.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        sort_by_relevance(&mut hits);
        hits.truncate(limit);
        Ok(hits)
    }

    pub fn get_memory_by_id(&self, memory_id: &str) -> Result<Option<Memory>> {
        let doc = self.load()?;
        let found = doc.categories.iter().find(|m| m.id == memory_id).cloned();
        Ok(found)
    }

    /// Returns whether a memory was removed.
    pub fn delete_memory(&self, memory_id: &str) -> Result<bool> {
        let mut doc = self.load()?;
        for category in Category::ALL {
            let list = doc.categories.get_mut(category);
            if let Some(index) = list.iter().position(|m| m.id == memory_id) {
                list.remove(index);
                doc.metadata.total_memories = doc.metadata.total_memories.saturating_sub(1);
                self.save(&mut doc)?;
                debug!(id = memory_id, "memory deleted");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Rewrites content and/or relevance in place. Returns whether the
    /// memory exists.
    pub fn update_memory(
        &self,
        memory_id: &str,
        content: Option<&str>,
        relevance_score: Option<f64>,
    ) -> Result<bool> {
        let mut doc = self.load()?;
        let Some(memory) = doc.categories.iter_mut().find(|m| m.id == memory_id) else {
            return Ok(false);
        };
        if let Some(content) = content {
            memory.content = content.to_string();
        }
        if let Some(score) = relevance_score {
            memory.relevance_score = score;
        }
        self.save(&mut doc)?;
        Ok(true)
    }

    /// Memories not in `reviewed`, oldest first.
    pub fn get_uncurated_memories(
        &self,
        reviewed: &HashSet<String>,
        limit: usize,
    ) -> Result<Vec<Memory>> {
        let doc = self.load()?;
        let mut pending: Vec<Memory> = doc
            .categories
            .iter()
            .filter(|m| !reviewed.contains(&m.id))
            .cloned()
            .collect();
        pending.sort_by_key(|m| m.timestamp);
        pending.truncate(limit);
        Ok(pending)
    }

    /// Stamps `metadata.last_compression`.
    pub fn mark_compressed(&self) -> Result<()> {
        let mut doc = self.load()?;
        doc.metadata.last_compression = Some(Utc::now());
        self.save(&mut doc)
    }
}

fn sort_by_relevance(memories: &mut [Memory]) {
    memories.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
}

pub fn render_markdown(doc: &MemoryDocument, category: Option<Category>) -> String {
    let mut lines = vec!["# MemoryLane Context".to_string(), String::new()];
    let categories: Vec<Category> = match category {
        Some(c) => vec![c],
        None => Category::ALL.to_vec(),
    };
    for cat in categories {
        let mut memories = doc.categories.get(cat).to_vec();
        if memories.is_empty() {
            continue;
        }
        sort_by_relevance(&mut memories);
        lines.push(format!("## {}", cat.title()));
        lines.push(String::new());
        for m in &memories {
            let stars = "⭐".repeat((m.relevance_score * 5.0).max(0.0) as usize);
            lines.push(format!("- {} {stars}", m.content));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| LaneError::Storage(format!("mkdir {}: {e}", parent.display())))?;
    }
    let tmp_path = path.with_extension("tmp");
    let result = (|| -> std::io::Result<()> {
        let mut f = fs::File::create(&tmp_path)?;
        f.write_all(data)?;
        f.flush()?;
        f.sync_all()?;
        fs::rename(&tmp_path, path)
    })();
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(LaneError::Storage(format!("write {}: {e}", path.display())));
    }
    Ok(())
}
