//! Structural clause segmentation and categorization

use super::{Clause, ClauseCategory, RiskClassifier};
use crate::config::SegmenterConfig;
use crate::patterns::PatternRegistry;
use regex::Regex;
use std::sync::Arc;

/// Splits raw document text into sections and labels each one.
///
/// Works on the raw (un-normalized) text since blank lines are one of the
/// section boundaries.
pub struct ClauseSegmenter {
    patterns: Arc<PatternRegistry>,
    /// Blank lines, numeric enumerators, lettered and roman sub-enumerators
    boundary: Regex,
    min_section_chars: usize,
}

impl ClauseSegmenter {
    pub fn new(patterns: Arc<PatternRegistry>, config: &SegmenterConfig) -> Self {
        Self {
            patterns,
            boundary: Regex::new(r"\n\s*\n|\d+\.\s+|\([a-z]\)\s+|\([ivx]+\)\s+")
                .expect("boundary regex"),
            min_section_chars: config.min_section_chars,
        }
    }

    /// Split text into sections, discarding fragments shorter than the
    /// configured minimum (headers, enumerator residue)
    pub fn segment(&self, text: &str) -> Vec<String> {
        self.boundary
            .split(text)
            .map(str::trim)
            .filter(|s| s.len() >= self.min_section_chars)
            .map(str::to_string)
            .collect()
    }

    /// First category in table order with any matching pattern wins;
    /// unmatched sections are General
    pub fn categorize(&self, section: &str) -> ClauseCategory {
        for (category, tier) in &self.patterns.categories {
            if tier.iter().any(|p| p.is_match(section)) {
                return *category;
            }
        }
        ClauseCategory::General
    }

    /// Segment text and assemble one [`Clause`] per retained section
    pub fn clauses(&self, text: &str, risk: &RiskClassifier) -> Vec<Clause> {
        self.segment(text)
            .into_iter()
            .enumerate()
            .map(|(position, content)| Clause {
                clause_id: format!("clause_{}", position + 1),
                category: self.categorize(&content),
                risk_level: risk.classify_clause(&content),
                content,
                position,
            })
            .collect()
    }
}
