//! Cheap token estimate shared by every engine.

/// Words-to-tokens multiplier.
pub const TOKENS_PER_WORD: f64 = 1.3;

/// Estimate model tokens as `round(word_count * 1.3)`.
pub fn estimate_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    (words as f64 * TOKENS_PER_WORD).round() as usize
}
