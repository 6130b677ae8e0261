//! Error types for save scheduling.

use thiserror::Error;

/// Errors produced by scheduler components and their collaborators.
#[derive(Debug, Error)]
pub enum SaverError {
    /// The state producer could not build a snapshot.
    #[error("collect failed: {0}")]
    Collect(String),
    /// The durable writer rejected the snapshot.
    #[error("write failed: {0}")]
    Write(String),
    /// An idle service delivered a topic other than `idle` or `active`.
    #[error("unexpected idle signal: {0}")]
    UnexpectedSignal(String),
    /// Configuration values are out of range or could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Filesystem failure from a file-backed writer.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot serialization failure.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Backend-specific failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
