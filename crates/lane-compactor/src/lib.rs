//! Token-budget context compression for MemoryLane.

pub mod dedup;
pub mod pipeline;
pub mod rank;
pub mod reconstruct;
pub mod section;
pub mod select;

pub use pipeline::{CompressedContext, ContextCompressor};
pub use section::{parse_sections, ParsedDocument, Section};
pub use select::{select_sections, SelectPolicy, Selection};

#[cfg(test)]
mod tests;
