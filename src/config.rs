//! Configuration management for lexindex
//!
//! All tunables are plain data loaded once at startup; components receive
//! immutable references and never consult global state.

use crate::error::{LexError, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub index: IndexConfig,
    pub segmenter: SegmenterConfig,
    /// Optional path to a TOML file overriding the built-in pattern tables
    #[serde(default)]
    pub patterns_file: Option<PathBuf>,
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Soft upper bound on chunk length in characters
    pub max_chunk_chars: usize,
    /// Overlap budget in characters; one trailing sentence is carried
    /// over per 100 characters requested
    pub overlap_chars: usize,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Embedding dimension (must match the external embedding model)
    pub dimension: usize,
    /// Over-fetch multiplier for document-scoped searches
    pub oversample_factor: usize,
    /// Directory holding the vectors and registry blobs
    pub data_dir: PathBuf,
}

/// Clause segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Sections shorter than this are treated as headers/noise
    pub min_section_chars: usize,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LexError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| LexError::Persistence {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| LexError::Persistence {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: LEXINDEX_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("LEXINDEX_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "CHUNKING__MAX_CHUNK_CHARS" => {
                self.chunking.max_chunk_chars = parse_env(path, value)?;
            }
            "CHUNKING__OVERLAP_CHARS" => {
                self.chunking.overlap_chars = parse_env(path, value)?;
            }
            "INDEX__DIMENSION" => {
                self.index.dimension = parse_env(path, value)?;
            }
            "INDEX__OVERSAMPLE_FACTOR" => {
                self.index.oversample_factor = parse_env(path, value)?;
            }
            "INDEX__DATA_DIR" => {
                self.index.data_dir = PathBuf::from(value);
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Validate the configuration, collecting all failures
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.chunking.max_chunk_chars == 0 {
            errors.push(ValidationError::new(
                "chunking.max_chunk_chars",
                "must be greater than zero",
            ));
        }
        if self.chunking.overlap_chars >= self.chunking.max_chunk_chars {
            errors.push(ValidationError::new(
                "chunking.overlap_chars",
                "must be smaller than max_chunk_chars",
            ));
        }
        if self.index.dimension == 0 {
            errors.push(ValidationError::new(
                "index.dimension",
                "must be greater than zero",
            ));
        }
        if self.index.oversample_factor == 0 {
            errors.push(ValidationError::new(
                "index.oversample_factor",
                "must be at least 1",
            ));
        }
        if self.segmenter.min_section_chars == 0 {
            errors.push(ValidationError::new(
                "segmenter.min_section_chars",
                "must be greater than zero",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(LexError::ConfigValidation { errors })
        }
    }
}

fn parse_env(path: &str, value: &str) -> Result<usize> {
    value.parse().map_err(|_| LexError::Config(format!(
        "Cannot parse '{}' as integer for {}",
        value, path
    )))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig {
                max_chunk_chars: 1000,
                overlap_chars: 200,
            },
            index: IndexConfig {
                dimension: 384,
                oversample_factor: 10,
                data_dir: PathBuf::from("data"),
            },
            segmenter: SegmenterConfig {
                min_section_chars: 50,
            },
            patterns_file: None,
        }
    }
}
