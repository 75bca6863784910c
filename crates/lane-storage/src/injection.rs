//! Context-rot guard and context assembly for prompt injection.

use lane_compactor::{CompressedContext, ContextCompressor};
use lane_core::config::LaneConfig;
use lane_core::{estimate_tokens, Category, Result};
use tracing::debug;

use crate::memory_store::MemoryStore;

/// Tokens available for injected memory given the incoming prompt, or
/// `None` when injecting would push the window past its safe fraction.
pub fn injection_budget(prompt: &str, config: &LaneConfig) -> Option<usize> {
    let cap = config.memory.max_context_tokens;
    let rot = &config.context_rot;
    if !rot.enabled {
        return (cap > 0).then_some(cap);
    }

    let safe = (rot.model_context_tokens as f64 * rot.safe_fraction).floor() as usize;
    let prompt_tokens = estimate_tokens(prompt);
    let available = safe
        .saturating_sub(prompt_tokens)
        .saturating_sub(rot.reserve_tokens);
    if available < rot.min_injection_tokens {
        debug!(safe, prompt_tokens, available, "injection skipped: context window near limit");
        return None;
    }
    let budget = cap.min(available);
    (budget > 0).then_some(budget)
}

/// Renders the store as markdown and compresses it into `budget` tokens.
pub fn build_context(
    store: &MemoryStore,
    category: Option<Category>,
    budget: usize,
    preserve: &[String],
) -> Result<CompressedContext> {
    let markdown = store.to_markdown(category)?;
    let compressor = ContextCompressor::new(budget.max(1));
    Ok(compressor.compress(&markdown, preserve))
}

/// Budget check plus context build for one prompt. `None` when the guard
/// refuses or the store holds nothing to inject.
pub fn prepare_injection(
    store: &MemoryStore,
    prompt: &str,
    config: &LaneConfig,
) -> Result<Option<CompressedContext>> {
    let Some(budget) = injection_budget(prompt, config) else {
        return Ok(None);
    };
    if store.load()?.categories.is_empty() {
        return Ok(None);
    }
    let context = build_context(store, None, budget, &config.compression.preserve_sections)?;
    if context.was_compressed() {
        store.mark_compressed()?;
    }
    debug!(
        budget,
        tokens = context.compressed_tokens,
        kept = context.sections_kept.len(),
        "memory context prepared"
    );
    Ok(Some(context))
}
