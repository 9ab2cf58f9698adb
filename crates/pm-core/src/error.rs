//! Core error type.
//!
//! Sub-crates define their own error enums and either convert them into
//! `CoreError` via `From` impls or wrap `CoreError` as one variant.

use thiserror::Error;

/// The top-level error type for `pm-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown event kind {0:?}")]
    EventKind(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `pm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
