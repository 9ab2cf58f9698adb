//! Error types for pm-output.

use pm_merge::Interrupt;
use thiserror::Error;

use crate::SinkKind;

/// Errors that can occur when writing merged events.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The sink's wait on the merged stream was cut short.
    #[error("sink interrupted while waiting for events: {0:?}")]
    Interrupted(Interrupt),

    #[error("unknown output format {0:?} (expected xml, csv, jsonl or sqlite)")]
    UnknownFormat(String),

    #[error("{0} output needs a file path")]
    PathRequired(SinkKind),

    #[error("{0} output is not compiled in (enable the `{0}` feature)")]
    Disabled(SinkKind),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
