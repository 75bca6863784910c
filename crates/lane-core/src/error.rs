use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaneError {
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Memory not found: {id}")]
    MemoryNotFound { id: String },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LaneError>;
