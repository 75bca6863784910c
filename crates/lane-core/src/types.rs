use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::LaneError;

/// The four fixed knowledge buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Patterns,
    Insights,
    Learnings,
    Context,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Patterns,
        Category::Insights,
        Category::Learnings,
        Category::Context,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Patterns => "patterns",
            Category::Insights => "insights",
            Category::Learnings => "learnings",
            Category::Context => "context",
        }
    }

    /// Map a model entry type onto a category. Unknown types land in `Insights`.
    pub fn from_model_type(entry_type: &str) -> Self {
        match entry_type {
            "design_decision" => Category::Insights,
            "problem_solved" => Category::Learnings,
            "pattern_established" => Category::Patterns,
            "constraint_discovered" | "future_consideration" | "dependency_added" => {
                Category::Context
            }
            _ => Category::Insights,
        }
    }

    /// Lenient parse used for model output: anything unrecognised is `Insights`.
    pub fn parse_lossy(value: &str) -> Self {
        value.parse().unwrap_or(Category::Insights)
    }

    /// Title-cased name used for markdown headings.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Patterns => "Patterns",
            Category::Insights => "Insights",
            Category::Learnings => "Learnings",
            Category::Context => "Context",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patterns" => Ok(Category::Patterns),
            "insights" => Ok(Category::Insights),
            "learnings" => Ok(Category::Learnings),
            "context" => Ok(Category::Context),
            other => Err(LaneError::InvalidCategory(other.to_string())),
        }
    }
}

/// A single extracted, not-yet-persisted knowledge snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMemory {
    pub content: String,
    pub category: Category,
    pub relevance_score: f64,
    pub source: String,
    pub strategy: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl CandidateMemory {
    pub fn new(
        content: impl Into<String>,
        category: Category,
        relevance_score: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            category,
            relevance_score,
            source: source.into(),
            strategy: "unknown".into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = strategy.into();
        self
    }

    pub fn with_meta(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Tags carried in metadata, if any.
    pub fn tags(&self) -> Vec<String> {
        self.metadata
            .get("tags")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
