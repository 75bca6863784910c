//! Persistent memory store, curation bookkeeping and context injection for
//! MemoryLane.

pub mod curation;
pub mod injection;
pub mod memory_store;

pub use curation::{CurationManager, CurationState};
pub use injection::{build_context, injection_budget, prepare_injection};
pub use memory_store::{
    is_contained_duplicate, parse_timestamp, render_markdown, CategoryStats, IngestReport, Memory,
    MemoryDocument, MemoryStore, StoreStats,
};
