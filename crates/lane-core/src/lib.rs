//! Shared types, configuration and errors for the MemoryLane engines.

pub mod config;
pub mod error;
pub mod tokens;
pub mod types;

pub use config::{ExtractionBackend, LaneConfig};
pub use error::{LaneError, Result};
pub use tokens::estimate_tokens;
pub use types::{CandidateMemory, Category};
