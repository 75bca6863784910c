//! Backend selection in front of the extraction primitives.

use lane_core::{CandidateMemory, ExtractionBackend, LaneConfig};
use serde_json::json;
use std::sync::Arc;

use crate::learner::ConversationLearner;
use crate::prompts::{format_extraction_request, LearningTrigger, TriggerContext};
use crate::response::parse_extraction_response;
use crate::summarizer::{MemorySummarizer, ModelClient};

/// Backends tried, in order, for a configured mode.
pub fn fallback_chain(backend: ExtractionBackend) -> &'static [ExtractionBackend] {
    match backend {
        ExtractionBackend::Auto => &[
            ExtractionBackend::Claude,
            ExtractionBackend::LocalLlm,
            ExtractionBackend::Regex,
        ],
        ExtractionBackend::Claude => &[ExtractionBackend::Claude],
        ExtractionBackend::LocalLlm => &[ExtractionBackend::LocalLlm],
        ExtractionBackend::Regex => &[ExtractionBackend::Regex],
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct ExtractRequest<'a> {
    pub trigger: Option<LearningTrigger>,
    pub context: TriggerContext,
    pub project_name: Option<&'a str>,
    pub additional_context: Option<&'a str>,
}

pub struct ExtractionService {
    pub backend: ExtractionBackend,
    primary: Option<Box<dyn ModelClient>>,
    local: ConversationLearner,
    heuristic: ConversationLearner,
}

impl ExtractionService {
    pub fn new(backend: ExtractionBackend) -> Self {
        Self {
            backend,
            primary: None,
            local: ConversationLearner::new(),
            heuristic: ConversationLearner::new(),
        }
    }

    pub fn from_config(config: &LaneConfig) -> Self {
        Self {
            backend: config.extraction.backend,
            primary: None,
            local: ConversationLearner::from_config(config),
            heuristic: ConversationLearner::from_config(config),
        }
    }

    pub fn with_primary(mut self, client: Box<dyn ModelClient>) -> Self {
        self.primary = Some(client);
        self
    }

    pub fn with_local_summarizer(mut self, summarizer: Arc<dyn MemorySummarizer>) -> Self {
        self.local = self.local.with_summarizer(summarizer);
        self
    }

    /// Run the configured backend (and, for `auto`, its fallbacks).
    pub fn extract(&self, text: &str, request: &ExtractRequest<'_>) -> Vec<CandidateMemory> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        for &backend in fallback_chain(self.backend) {
            let found = self.run(backend, text, request);
            if !found.is_empty() {
                tracing::debug!(backend = %backend, count = found.len(), "extraction backend succeeded");
                return found;
            }
            tracing::debug!(backend = %backend, "extraction backend produced nothing");
        }
        Vec::new()
    }

    fn run(&self, backend: ExtractionBackend, text: &str, request: &ExtractRequest<'_>) -> Vec<CandidateMemory> {
        match backend {
            ExtractionBackend::Claude => self.run_primary(text, request),
            ExtractionBackend::LocalLlm => tag_source(self.local.extract_from_text(text, "local_llm"), "local_llm"),
            ExtractionBackend::Regex => tag_source(self.heuristic.extract_from_text(text, "regex"), "regex"),
            ExtractionBackend::Auto => Vec::new(),
        }
    }

    fn run_primary(&self, text: &str, request: &ExtractRequest<'_>) -> Vec<CandidateMemory> {
        let Some(client) = &self.primary else {
            return Vec::new();
        };
        let trigger = request
            .trigger
            .unwrap_or_else(|| LearningTrigger::detect(&request.context));
        let message = format_extraction_request(text, request.project_name, request.additional_context);
        match client.complete(&trigger.system_prompt(), &message) {
            Ok(Some(reply)) => parse_extraction_response(&reply, "claude"),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::debug!(error = %err, trigger = %trigger, "primary model call failed");
                Vec::new()
            }
        }
    }
}

/// Stamp the backend tag and make sure every candidate carries a tag list.
fn tag_source(candidates: Vec<CandidateMemory>, source: &str) -> Vec<CandidateMemory> {
    candidates
        .into_iter()
        .map(|mut c| {
            c.source = source.to_string();
            c.metadata.entry("tags".to_string()).or_insert_with(|| json!([]));
            c
        })
        .collect()
}
