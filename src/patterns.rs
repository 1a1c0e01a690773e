//! Pattern registry for risk scoring and clause categorization
//!
//! Pattern tables are plain configuration data: three risk tiers plus an
//! ordered category table, compiled once into case-insensitive regexes at
//! startup. A malformed pattern is a configuration error and fails
//! construction; nothing is compiled lazily.

use crate::analysis::ClauseCategory;
use crate::error::{LexError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Risk tier tables, ordered by severity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskPatternsConfig {
    pub critical: Vec<String>,
    pub high: Vec<String>,
    pub medium: Vec<String>,
}

/// One category with its ordered pattern list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub category: ClauseCategory,
    pub patterns: Vec<String>,
}

/// Pattern configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsConfig {
    pub risk: RiskPatternsConfig,
    /// Scanned in order; first category with any match wins
    pub categories: Vec<CategoryConfig>,
}

/// Registry of pre-compiled pattern tables
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    pub critical: Vec<Regex>,
    pub high: Vec<Regex>,
    pub medium: Vec<Regex>,
    pub categories: Vec<(ClauseCategory, Vec<Regex>)>,
}

impl PatternRegistry {
    /// Compile a registry from parsed configuration
    pub fn from_config(config: &PatternsConfig) -> Result<Self> {
        let critical = compile_tier("risk.critical", &config.risk.critical)?;
        let high = compile_tier("risk.high", &config.risk.high)?;
        let medium = compile_tier("risk.medium", &config.risk.medium)?;

        let mut categories = Vec::with_capacity(config.categories.len());
        for cat in &config.categories {
            let name = format!("categories.{}", cat.category);
            categories.push((cat.category, compile_tier(&name, &cat.patterns)?));
        }

        Ok(Self {
            critical,
            high,
            medium,
            categories,
        })
    }

    /// Load and compile a registry from a TOML file
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LexError::Persistence {
            source: e,
            context: format!("Failed to read patterns file: {:?}", path),
        })?;
        let config: PatternsConfig = toml::from_str(&content)?;
        Self::from_config(&config)
    }

    /// Compile the built-in pattern set
    pub fn builtin() -> Result<Self> {
        Self::from_config(&PatternsConfig::default())
    }
}

fn compile_tier(table: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| LexError::InvalidPattern {
                    name: format!("{}: {}", table, p),
                    source: e,
                })
        })
        .collect()
}

impl Default for PatternsConfig {
    fn default() -> Self {
        let risk = RiskPatternsConfig {
            critical: to_strings(&[
                r"unlimited.*liability",
                r"criminal.*liability",
                r"personal.*assets.*at.*risk",
                r"immediate.*termination.*without.*cause",
                r"waive.*all.*rights",
                r"hold.*harmless.*any.*and.*all",
                r"joint.*and.*several.*liability",
                r"successor.*and.*assigns.*bound",
            ]),
            high: to_strings(&[
                r"penalty|penalties|fine|fines",
                r"termination.*without.*notice",
                r"liquidated.*damages",
                r"indemnif(y|ication)",
                r"liability.*unlimited",
                r"personal.*guarantee",
                r"automatic.*renewal",
                r"non-compete|non.*compete",
                r"exclusive.*jurisdiction",
                r"waiver.*of.*rights",
            ]),
            medium: to_strings(&[
                r"arbitration.*mandatory",
                r"governing.*law",
                r"force.*majeure",
                r"confidentiality|non.*disclosure",
                r"intellectual.*property",
                r"assignment.*prohibited",
                r"modification.*writing",
                r"entire.*agreement",
                r"severability",
                r"notice.*requirements",
            ]),
        };

        let categories = vec![
            CategoryConfig {
                category: ClauseCategory::Payment,
                patterns: to_strings(&[
                    r"payment|pay|fee|cost|price|amount|invoice|billing",
                    r"installment|deposit|advance|refund|reimbursement",
                ]),
            },
            CategoryConfig {
                category: ClauseCategory::Termination,
                patterns: to_strings(&[
                    r"termination|terminate|end|expire|expiry|dissolution",
                    r"breach|default|violation|non-compliance",
                ]),
            },
            CategoryConfig {
                category: ClauseCategory::Liability,
                patterns: to_strings(&[
                    r"liability|liable|responsible|damages|loss|harm",
                    r"indemnif|hold.*harmless|compensation",
                ]),
            },
            CategoryConfig {
                category: ClauseCategory::IntellectualProperty,
                patterns: to_strings(&[
                    r"intellectual.*property|copyright|trademark|patent",
                    r"proprietary|confidential|trade.*secret",
                ]),
            },
            CategoryConfig {
                category: ClauseCategory::Obligation,
                patterns: to_strings(&[
                    r"shall|must|required|obligation|duty|covenant",
                    r"undertake|agree.*to|commit.*to",
                ]),
            },
            CategoryConfig {
                category: ClauseCategory::Warranty,
                patterns: to_strings(&[
                    r"warrant|guarantee|represent|assure|promise",
                    r"condition|quality|fitness.*for.*purpose",
                ]),
            },
        ];

        Self { risk, categories }
    }
}

fn to_strings(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}
