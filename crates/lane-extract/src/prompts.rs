//! Trigger-specific extraction prompts for the primary model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What prompted a learning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningTrigger {
    #[default]
    SessionEnd,
    TaskCompletion,
    ErrorResolution,
    FeatureImplementation,
    Refactor,
    Debugging,
}

/// Signals used to pick a trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerContext {
    pub has_error: bool,
    pub was_fixed: bool,
    pub new_files_created: bool,
    pub task_completed: bool,
    pub files_edited: usize,
    pub files_created: usize,
}

const BASE_PRINCIPLES: &str = "\
Core principles:
1. Extract knowledge, not actions. \"We use X\" rather than \"I ran X\".
2. Capture why a decision was made, not only what was done.
3. Prefer insights that will help future work on this project.
4. Keep each memory to one or two sentences.
5. Skip generic advice and obvious best practices.
6. Favour project-specific knowledge that is not already documented.";

const OUTPUT_SCHEMA: &str = r#"{
  "memories": [
    {
      "category": "patterns | insights | learnings | context",
      "content": "The insight itself, one or two sentences",
      "relevance": 0.0,
      "tags": ["tag1", "tag2"]
    }
  ]
}"#;

impl LearningTrigger {
    pub const ALL: [LearningTrigger; 6] = [
        Self::SessionEnd,
        Self::TaskCompletion,
        Self::ErrorResolution,
        Self::FeatureImplementation,
        Self::Refactor,
        Self::Debugging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionEnd => "session_end",
            Self::TaskCompletion => "task_completion",
            Self::ErrorResolution => "error_resolution",
            Self::FeatureImplementation => "feature_implementation",
            Self::Refactor => "refactor",
            Self::Debugging => "debugging",
        }
    }

    /// Pick the trigger for a context. Earlier rules take priority.
    pub fn detect(ctx: &TriggerContext) -> Self {
        if ctx.has_error && ctx.was_fixed {
            Self::ErrorResolution
        } else if ctx.has_error {
            Self::Debugging
        } else if ctx.new_files_created && ctx.task_completed {
            Self::FeatureImplementation
        } else if ctx.files_edited > ctx.files_created && ctx.task_completed {
            Self::Refactor
        } else if ctx.task_completed {
            Self::TaskCompletion
        } else {
            Self::SessionEnd
        }
    }

    pub fn extraction_focus(&self) -> &'static [&'static str] {
        match self {
            Self::SessionEnd => &["decisions", "patterns", "solutions", "architecture", "gotchas"],
            Self::TaskCompletion => &["feature_summary", "decisions", "integration", "gotchas"],
            Self::ErrorResolution => &["root_cause", "fix", "prevention"],
            Self::FeatureImplementation => &["architecture", "rationale", "interface", "edge_cases"],
            Self::Refactor => &["before_after", "motivation", "impact"],
            Self::Debugging => &["symptoms", "root_cause", "diagnostics"],
        }
    }

    fn situation(&self) -> &'static str {
        match self {
            Self::SessionEnd => "analyzing a completed coding session. Extract all knowledge that would help a future developer on this project.",
            Self::TaskCompletion => "analyzing a completed task. Extract what makes the work understandable and reproducible.",
            Self::ErrorResolution => "analyzing an error that was just resolved. Capture it so the mistake is not repeated.",
            Self::FeatureImplementation => "analyzing a feature implementation. Extract what helps understand and maintain it.",
            Self::Refactor => "analyzing a refactoring session. Capture what changed and why.",
            Self::Debugging => "analyzing a debugging session. Extract how the bug showed up and what was actually wrong.",
        }
    }

    fn guidance(&self) -> &'static str {
        match self {
            Self::SessionEnd => "\
Categories:
- patterns: reusable approaches, conventions, architectural decisions
- insights: non-obvious findings
- learnings: bug fixes and solutions with their root cause
- context: project structure, config locations, API details, dependencies

Extract 3-10 memories. Skip individual file edits, test runs and conversational filler.",
            Self::TaskCompletion => "\
Focus on what was built, the key decisions and alternatives considered, integration points, \
gotchas and the patterns that were followed or established.

Extract 2-5 memories, each independently valuable.",
            Self::ErrorResolution => "\
Focus on the root cause, the fix, how to prevent it and related risks.
Phrase each learning as \"[Problem]: [Root cause]. [Solution].\"

Extract 1-3 memories.",
            Self::FeatureImplementation => "\
Focus on architecture, design rationale, interfaces, edge cases and dependencies.

Extract 3-6 memories a new developer would need.",
            Self::Refactor => "\
Focus on the old and new pattern, the motivation, the impact and how remaining code should migrate.

Extract 1-4 memories.",
            Self::Debugging => "\
Focus on symptoms, what was ruled out, the root cause, the fix and diagnostic tips.

Extract 1-3 memories.",
        }
    }

    /// Full system prompt for this trigger. Every trigger shares one output schema.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are a knowledge extractor for MemoryLane, {}\n\n{}\n\n{}\n\nReturn ONLY valid JSON matching this schema:\n{}",
            self.situation(),
            BASE_PRINCIPLES,
            self.guidance(),
            OUTPUT_SCHEMA,
        )
    }
}

impl fmt::Display for LearningTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningTrigger {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to `SessionEnd`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .unwrap_or_default())
    }
}

/// User message for an extraction call.
pub fn format_extraction_request(
    transcript: &str,
    project_name: Option<&str>,
    additional_context: Option<&str>,
) -> String {
    let mut parts = Vec::new();
    if let Some(project) = project_name.filter(|p| !p.is_empty()) {
        parts.push(format!("Project: {project}"));
    }
    if let Some(extra) = additional_context.filter(|c| !c.is_empty()) {
        parts.push(format!("Context: {extra}"));
    }
    parts.push(format!("Session transcript:\n{transcript}"));
    parts.join("\n\n")
}
