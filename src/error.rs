//! Error types for the knowledge-graph pipeline.
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use crate::types::Qn;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {language} file '{path}': {reason}")]
    Parse {
        path: PathBuf,
        language: String,
        reason: String,
    },

    #[error(
        "Unsupported file type '{extension}' for file '{path}'. Supported types: .kt, .kts, .java"
    )]
    UnsupportedFileType { path: PathBuf, extension: String },

    /// Two Phase-1 declarations disagree on the NodeKind for the same QN.
    /// This is the one fatal, run-aborting condition (§7: "internal
    /// invariant violation").
    #[error(
        "conflicting node kind for '{qn}': first seen as {first:?} (in '{first_path}'), then as {second:?} (in '{second_path}')"
    )]
    ConflictingKind {
        qn: Qn,
        first: crate::types::NodeKind,
        first_path: PathBuf,
        second: crate::types::NodeKind,
        second_path: PathBuf,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] figment::Error),

    #[error("failed to walk directory tree: {0}")]
    Walk(#[from] ignore::Error),
}

/// Result type alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Recovery suggestions for this error, surfaced by the CLI.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Parse { .. } => vec![
                "The file is skipped; other files continue to be indexed",
                "Check that the file is valid source for its language",
            ],
            Self::ConflictingKind { .. } => vec![
                "Two declarations in the repository share a qualified name with different kinds",
                "Check for duplicate package/class names across source roots",
            ],
            Self::UnsupportedFileType { .. } => vec![
                "Currently only Kotlin (.kt, .kts) and Java (.java) files are supported",
            ],
            _ => vec![],
        }
    }
}

/// Extension trait for attaching file-scoped context to a foreign error at
/// the CLI boundary, where the top-level error type is `anyhow::Error`.
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> anyhow::Result<T>;
    fn with_path(self, path: &std::path::Path) -> anyhow::Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::anyhow!("{msg}: {e}"))
    }

    fn with_path(self, path: &std::path::Path) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::anyhow!("error processing '{}': {e}", path.display()))
    }
}
