//! Error types for the papercover core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering corpus loading, configuration, and the coverage reducer.
//! Every variant carries the offending paper, author, file, or field so a
//! failed run can be diagnosed without re-running it.

use std::path::PathBuf;

/// Top-level error type for the papercover core library.
#[derive(Debug, thiserror::Error)]
pub enum PaperCoverError {
    #[error("Malformed input: {0}")]
    Corpus(#[from] CorpusError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Coverage error: {0}")]
    Cover(#[from] CoverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from loading paper records and author lists.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("Record {index} in {file} has no paper identifier")]
    MissingIdentifier { file: String, index: usize },

    #[error("Paper '{paper}' has no author list")]
    MissingAuthors { paper: String },

    #[error("Paper identifier '{paper}' appears more than once")]
    DuplicatePaper { paper: String },

    #[error("Failed to parse {path}: {message}")]
    InvalidFile { path: PathBuf, message: String },

    #[error("Corpus directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Invalid active author list {path}: {message}")]
    InvalidActiveList { path: PathBuf, message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Threshold '{field}' must not be negative (got {value})")]
    NegativeThreshold { field: String, value: i64 },

    #[error("Threshold '{field}' is out of range (got {value})")]
    ThresholdOutOfRange { field: String, value: i64 },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Failed to load configuration: {message}")]
    Load { message: String },
}

/// Errors from the coverage reducer and its verifier.
#[derive(Debug, thiserror::Error)]
pub enum CoverError {
    #[error("Active author '{author}' appears on no paper ({uncovered} active authors left uncovered)")]
    UncoverableAuthor { author: String, uncovered: usize },

    #[error("Covering set misses {} active authors, first: '{}'", .missing.len(), .missing.first().map(String::as_str).unwrap_or(""))]
    CoverageViolation { missing: Vec<String> },

    #[error("Covering set references unknown paper '{paper}'")]
    UnknownPaper { paper: String },

    #[error("Covering set selects paper '{paper}' more than once")]
    DuplicateSelection { paper: String },
}

/// A type alias for results using the top-level `PaperCoverError`.
pub type Result<T> = std::result::Result<T, PaperCoverError>;
