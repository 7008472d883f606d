use std::path::PathBuf;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Errors surfaced by the scoring pipeline.
///
/// Retry exhaustion and empty report text are deliberately absent: both are
/// normal outcomes of a run, not failures.
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("Unknown prompt '{key}'. Available prompts: {available}")]
    UnknownPrompt { key: String, available: String },

    #[error("Invalid prompt catalog {path}: {reason}")]
    Catalog { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Record '{id}' is not a JSON object")]
    MalformedRecord { id: String },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}
