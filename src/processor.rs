//! Document processing pipeline
//!
//! Bundles the chunker, risk classifier, and clause segmenter behind one
//! constructor so callers process a document in a single pass. Everything
//! here is pure text work; embedding the resulting chunks is the caller's
//! job via an external [`EmbeddingProvider`](crate::providers::EmbeddingProvider).

use crate::analysis::{Clause, ClauseSegmenter, RiskClassifier, RiskLevel};
use crate::chunker::{Chunk, Chunker};
use crate::config::Config;
use crate::error::Result;
use crate::patterns::PatternRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Everything derived from one document's text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub chunks: Vec<Chunk>,
    pub clauses: Vec<Clause>,
    pub risk_level: RiskLevel,
}

/// Metadata reported by plain-text extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextMetadata {
    pub total_lines: usize,
    pub encoding: &'static str,
}

/// One-pass document processor over immutable pattern tables
pub struct DocumentProcessor {
    chunker: Chunker,
    risk: RiskClassifier,
    segmenter: ClauseSegmenter,
}

impl DocumentProcessor {
    /// Build a processor from configuration, compiling the pattern tables
    /// once. A malformed pattern table fails here, at startup.
    pub fn new(config: &Config) -> Result<Self> {
        let registry = match &config.patterns_file {
            Some(path) => PatternRegistry::from_config_file(path)?,
            None => PatternRegistry::builtin()?,
        };
        let registry = Arc::new(registry);

        Ok(Self {
            chunker: Chunker::new(&config.chunking),
            risk: RiskClassifier::new(Arc::clone(&registry)),
            segmenter: ClauseSegmenter::new(registry, &config.segmenter),
        })
    }

    /// Chunk, segment, and risk-score one document's text
    pub fn process(&self, text: &str) -> DocumentAnalysis {
        let chunks = self.chunker.chunk(text);
        let clauses = self.segmenter.clauses(text, &self.risk);
        let risk_level = self.risk.classify_document(text);

        info!(
            chunks = chunks.len(),
            clauses = clauses.len(),
            risk = %risk_level,
            "Processed document"
        );

        DocumentAnalysis {
            chunks,
            clauses,
            risk_level,
        }
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    pub fn risk_classifier(&self) -> &RiskClassifier {
        &self.risk
    }

    pub fn segmenter(&self) -> &ClauseSegmenter {
        &self.segmenter
    }

    /// Decode plain-text bytes as UTF-8, falling back to Latin-1 (every
    /// byte sequence is valid Latin-1, so this cannot fail)
    pub fn extract_plain_text(bytes: &[u8]) -> (String, TextMetadata) {
        let (text, encoding) = match std::str::from_utf8(bytes) {
            Ok(text) => (text.to_string(), "utf-8"),
            Err(_) => (bytes.iter().map(|&b| b as char).collect(), "latin-1"),
        };

        let metadata = TextMetadata {
            total_lines: text.lines().count(),
            encoding,
        };
        (text, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ClauseCategory;

    fn processor() -> DocumentProcessor {
        DocumentProcessor::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_process_produces_chunks_clauses_and_risk() {
        let text = "The client agrees to pay all invoices within thirty days.\n\n\
                    The vendor provides indemnification for third party claims. \
                    Liquidated damages apply to late delivery of the software. \
                    This agreement is subject to automatic renewal each year.";

        let analysis = processor().process(text);

        assert!(!analysis.chunks.is_empty());
        assert_eq!(analysis.clauses.len(), 2);
        assert_eq!(analysis.clauses[0].category, ClauseCategory::Payment);
        // Three distinct high-tier patterns, no critical one
        assert_eq!(analysis.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_empty_document_is_low_risk_and_empty() {
        let analysis = processor().process("");
        assert!(analysis.chunks.is_empty());
        assert!(analysis.clauses.is_empty());
        assert_eq!(analysis.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_extract_plain_text_utf8() {
        let (text, meta) = DocumentProcessor::extract_plain_text("line one\nline two".as_bytes());
        assert_eq!(text, "line one\nline two");
        assert_eq!(meta.total_lines, 2);
        assert_eq!(meta.encoding, "utf-8");
    }

    #[test]
    fn test_extract_plain_text_latin1_fallback() {
        // 0xE9 is 'é' in Latin-1 but invalid standalone UTF-8
        let (text, meta) = DocumentProcessor::extract_plain_text(&[b'c', b'a', b'f', 0xE9]);
        assert_eq!(text, "café");
        assert_eq!(meta.encoding, "latin-1");
    }

    #[test]
    fn test_malformed_patterns_file_fails_at_startup() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("patterns.toml");
        std::fs::write(&path, "risk = \"not a table\"").unwrap();

        let mut config = Config::default();
        config.patterns_file = Some(path);
        assert!(DocumentProcessor::new(&config).is_err());
    }
}
