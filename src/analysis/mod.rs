//! Risk and clause analysis over legal document text
//!
//! Both analyzers are pure functions of their input text plus the
//! immutable pattern tables compiled at startup.

mod risk;
mod segmenter;

pub use risk::RiskClassifier;
pub use segmenter::ClauseSegmenter;

use serde::{Deserialize, Serialize};

/// Document or clause risk severity, ordered lowest to highest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Structural category assigned to a clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseCategory {
    Payment,
    Termination,
    Liability,
    IntellectualProperty,
    Obligation,
    Warranty,
    General,
}

impl std::fmt::Display for ClauseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClauseCategory::Payment => "payment",
            ClauseCategory::Termination => "termination",
            ClauseCategory::Liability => "liability",
            ClauseCategory::IntellectualProperty => "intellectual_property",
            ClauseCategory::Obligation => "obligation",
            ClauseCategory::Warranty => "warranty",
            ClauseCategory::General => "general",
        };
        f.write_str(s)
    }
}

/// One structurally segmented portion of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clause {
    /// Sequential identifier within one segmentation pass ("clause_1", ...)
    pub clause_id: String,
    pub content: String,
    pub category: ClauseCategory,
    pub risk_level: RiskLevel,
    /// Zero-based segment position in the document
    pub position: usize,
}
