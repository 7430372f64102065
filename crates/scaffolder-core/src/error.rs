//! Error categories surfaced by the scaffolding pipeline
//!
//! Most functions return `anyhow::Result` and attach context as errors bubble up.
//! The variants here mark the failures callers may want to tell apart
//! (via `downcast_ref`), e.g. a bad registry versus a failed download.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// Registry or argument problem that no amount of retrying fixes
    #[error("configuration error: {0}")]
    Config(String),

    /// Target path is occupied and `--force` was not given
    #[error("{0}")]
    Conflict(String),

    /// A templated path resolved outside of the target directory
    #[error("refusing to write outside of target directory: {}", .0.display())]
    PathEscape(PathBuf),

    /// Boilerplate retrieval failed
    #[error("failed to fetch boilerplate '{package}': {reason}")]
    Fetch { package: String, reason: String },
}

impl ScaffoldError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
