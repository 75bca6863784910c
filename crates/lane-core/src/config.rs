//! Layered configuration: defaults, overridden by a partial JSON file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{LaneError, Result};

pub const CONFIG_DIR: &str = ".memorylane";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    pub memory: MemoryConfig,
    pub compression: CompressionConfig,
    pub extraction: ExtractionConfig,
    pub summarizer: SummarizerConfig,
    pub context_rot: ContextRotConfig,
    pub curation: CurationConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub max_context_tokens: usize,
    pub relevance_threshold: f64,
    pub max_memories_per_category: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: 2000,
            relevance_threshold: 0.7,
            max_memories_per_category: 150,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub target_tokens: usize,
    pub summarize_max_lines: usize,
    pub summarize_threshold: f64,
    pub preserve_sections: Vec<String>,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            target_tokens: 2000,
            summarize_max_lines: 3,
            summarize_threshold: 0.7,
            preserve_sections: Vec::new(),
        }
    }
}

/// Which extraction family is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExtractionBackend {
    /// Primary model, then local model, then heuristics.
    #[default]
    Auto,
    /// Primary model only; an empty result is final.
    Claude,
    LocalLlm,
    Regex,
}

impl ExtractionBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Claude => "claude",
            Self::LocalLlm => "local_llm",
            Self::Regex => "regex",
        }
    }

    /// Unknown names degrade to `Auto`.
    pub fn from_str_loose(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "claude" => Self::Claude,
            "local_llm" => Self::LocalLlm,
            "regex" => Self::Regex,
            _ => Self::Auto,
        }
    }
}

impl From<String> for ExtractionBackend {
    fn from(value: String) -> Self {
        Self::from_str_loose(&value)
    }
}

impl From<ExtractionBackend> for String {
    fn from(value: ExtractionBackend) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ExtractionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub backend: ExtractionBackend,
    pub claude_model: String,
    pub claude_max_tokens: usize,
    pub claude_timeout_secs: u64,
    pub min_words: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            backend: ExtractionBackend::Auto,
            claude_model: "claude-haiku-4-5-20251001".into(),
            claude_max_tokens: 2048,
            claude_timeout_secs: 60,
            min_words: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub enabled: bool,
    pub confidence_threshold: f64,
    pub max_input_tokens: usize,
    pub min_session_length: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_threshold: 0.7,
            max_input_tokens: 4096,
            min_session_length: 0,
        }
    }
}

/// Guard against injecting context into an already crowded model window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextRotConfig {
    pub enabled: bool,
    pub model_context_tokens: usize,
    pub safe_fraction: f64,
    pub reserve_tokens: usize,
    pub min_injection_tokens: usize,
}

impl Default for ContextRotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_context_tokens: 200_000,
            safe_fraction: 0.5,
            reserve_tokens: 1200,
            min_injection_tokens: 200,
        }
    }
}

/// When a review pass over stored memories is due.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    pub enabled: bool,
    /// Unreviewed memories needed before curation triggers.
    pub trigger_memory_count: usize,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trigger_memory_count: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub memory_dir: PathBuf,
    pub memories_file: PathBuf,
    pub backup_dir: PathBuf,
    pub curation_state_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            memory_dir: PathBuf::from(CONFIG_DIR),
            memories_file: PathBuf::from(CONFIG_DIR).join("memories.json"),
            backup_dir: PathBuf::from(CONFIG_DIR).join("backups"),
            curation_state_file: PathBuf::from(CONFIG_DIR).join("curation_state.json"),
        }
    }
}

impl LaneConfig {
    /// Candidate config files in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(CONFIG_DIR).join(CONFIG_FILE));
            paths.push(cwd.join(CONFIG_FILE));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_DIR).join(CONFIG_FILE));
        }
        paths
    }

    /// Load from `explicit` or the first existing search path; defaults when none exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::search_paths().into_iter().find(|p| p.exists()),
        };
        let Some(path) = path else {
            tracing::debug!("no config file found, using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let cfg = Self::from_json(&raw)
            .map_err(|e| LaneError::Config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), backend = %cfg.extraction.backend, "loaded config");
        Ok(cfg)
    }

    /// Parse a (possibly partial) JSON document over the defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.compression.target_tokens == 0 {
            return Err(LaneError::Config(
                "compression.target_tokens must be >= 1".into(),
            ));
        }
        for (name, value) in [
            ("memory.relevance_threshold", self.memory.relevance_threshold),
            ("compression.summarize_threshold", self.compression.summarize_threshold),
            ("summarizer.confidence_threshold", self.summarizer.confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LaneError::Config(format!("{name} must be within [0, 1]")));
            }
        }
        let fraction = self.context_rot.safe_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(LaneError::Config(
                "context_rot.safe_fraction must be within (0, 1]".into(),
            ));
        }
        Ok(())
    }
}
