//! Error types

use std::path::PathBuf;
use thiserror::Error;

/// The precompiler rejected a template
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that abort a bundle build
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Handlebars failed to compile {path}: {source}")]
    Compile {
        path: String,
        #[source]
        source: CompileError,
    },

    #[error("Failed to read source file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write destination {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Invalid regex for {field}: '{pattern}'")]
    InvalidRegex {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Target not found: {0}")]
    UnknownTarget(String),
}
