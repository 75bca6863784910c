//! Knowledge extraction for MemoryLane: sentence heuristics, quality gating,
//! model-backed summarization and backend fallback.

pub mod backend;
pub mod dedup;
pub mod learner;
pub mod noise;
pub mod prompts;
pub mod quality;
pub mod response;
pub mod scoring;
pub mod segmenter;
pub mod strategies;
pub mod summarizer;
pub mod transcript;

pub use backend::{fallback_chain, ExtractRequest, ExtractionService};
pub use dedup::dedupe_by_score;
pub use learner::ConversationLearner;
pub use noise::is_code_or_noise;
pub use prompts::{format_extraction_request, LearningTrigger, TriggerContext};
pub use quality::{clean_content, is_complete_thought};
pub use scoring::calculate_relevance;
pub use segmenter::split_sentences;
pub use strategies::{default_strategies, ExtractionStrategy};
pub use summarizer::{ChunkedSummarizer, MemorySummarizer, ModelClient, ModelEntry, SummaryResponse};
