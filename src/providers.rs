//! Interfaces to external collaborators
//!
//! The retrieval core never produces embeddings or natural-language text
//! itself; these traits are the seams where hosted services plug in.
//! Implementations live outside this crate and must be called outside any
//! lock held on the index, with caller-supplied timeouts.

use crate::error::Result;
use std::collections::HashMap;

/// Extraction metadata reported alongside the text
pub type ExtractionMetadata = HashMap<String, String>;

/// Turns raw file bytes into text plus extraction metadata
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], content_type: &str) -> Result<(String, ExtractionMetadata)>;
}

/// Turns text into fixed-dimension embedding vectors
///
/// `embed_batch` must preserve input order; every returned vector must
/// have length `dimension()`.
pub trait EmbeddingProvider: Send + Sync {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;
}

/// Produces natural-language text (summaries, explanations, translations)
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String>;
}
