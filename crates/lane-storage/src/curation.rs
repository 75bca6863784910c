//! Curation bookkeeping: which memories have already been reviewed and
//! whether enough new ones have piled up to warrant another pass.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lane_core::config::{CurationConfig, LaneConfig};
use lane_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::memory_store::{lenient_time, lenient_time_opt, write_atomic};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurationState {
    #[serde(default, deserialize_with = "lenient_time_opt")]
    pub last_curated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub memories_reviewed: Vec<String>,
    #[serde(default)]
    pub curation_count: u64,
    #[serde(default = "Utc::now", deserialize_with = "lenient_time")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "lenient_time_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Default for CurationState {
    fn default() -> Self {
        Self {
            last_curated: None,
            memories_reviewed: Vec::new(),
            curation_count: 0,
            created_at: Utc::now(),
            last_modified: None,
        }
    }
}

/// Curation state persisted next to the memory file.
#[derive(Debug, Clone)]
pub struct CurationManager {
    state_path: PathBuf,
}

impl CurationManager {
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
        }
    }

    pub fn from_config(config: &LaneConfig) -> Self {
        Self::new(config.paths.curation_state_file.clone())
    }

    pub fn path(&self) -> &Path {
        &self.state_path
    }

    /// Missing or unreadable state starts fresh.
    pub fn load_state(&self) -> Result<CurationState> {
        let raw = match fs::read_to_string(&self.state_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CurationState::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(path = %self.state_path.display(), error = %e, "curation state unreadable, starting fresh");
                Ok(CurationState::default())
            }
        }
    }

    pub fn save_state(&self, state: &mut CurationState) -> Result<()> {
        state.last_modified = Some(Utc::now());
        let json = serde_json::to_string_pretty(state)?;
        write_atomic(&self.state_path, json.as_bytes())
    }

    /// True when curation is enabled and at least `trigger_memory_count`
    /// of `memory_count` stored memories have not been reviewed.
    pub fn needs_curation(&self, config: &CurationConfig, memory_count: usize) -> Result<bool> {
        if !config.enabled {
            return Ok(false);
        }
        let reviewed = self.load_state()?.memories_reviewed.len();
        let uncurated = memory_count.saturating_sub(reviewed);
        debug!(uncurated, threshold = config.trigger_memory_count, "curation check");
        Ok(uncurated >= config.trigger_memory_count)
    }

    /// Records a review pass over `memory_ids`.
    pub fn mark_curated<S: AsRef<str>>(&self, memory_ids: &[S]) -> Result<()> {
        let mut state = self.load_state()?;
        let mut seen: HashSet<String> = state.memories_reviewed.iter().cloned().collect();
        for id in memory_ids {
            let id = id.as_ref();
            if seen.insert(id.to_string()) {
                state.memories_reviewed.push(id.to_string());
            }
        }
        state.last_curated = Some(Utc::now());
        state.curation_count += 1;
        self.save_state(&mut state)
    }

    pub fn get_reviewed_ids(&self) -> Result<HashSet<String>> {
        Ok(self.load_state()?.memories_reviewed.into_iter().collect())
    }

    pub fn reset(&self) -> Result<()> {
        self.save_state(&mut CurationState::default())
    }
}
