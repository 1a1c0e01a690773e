use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the lexindex retrieval core
#[derive(Error, Debug)]
pub enum LexError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Invalid regex in a pattern table (fatal at startup)
    #[error("Invalid pattern '{name}': {source}")]
    InvalidPattern { name: String, source: regex::Error },

    /// Chunk count does not match embedding count
    #[error("Count mismatch: {chunks} chunks but {embeddings} embeddings")]
    CountMismatch { chunks: usize, embeddings: usize },

    /// Embedding length does not match the index dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Disk write/read failures during index persistence
    #[error("Persistence error: {context}: {source}")]
    Persistence {
        source: std::io::Error,
        context: String,
    },

    /// On-disk index state that cannot be trusted (mismatched or
    /// undecodable blob pair); never silently replaced by an empty index
    #[error("Corrupt index state at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Binary encoding failures while persisting index state
    #[error("Index codec error: {context}: {source}")]
    Codec {
        source: bincode::Error,
        context: String,
    },

    /// Input bytes that cannot be decoded as text
    #[error("Text extraction error: {0}")]
    Extraction(String),

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for lexindex operations
pub type Result<T> = std::result::Result<T, LexError>;
