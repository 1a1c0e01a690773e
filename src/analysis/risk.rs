//! Risk scoring against ordered severity pattern tiers

use super::RiskLevel;
use crate::patterns::PatternRegistry;
use std::sync::Arc;

/// Scores free text against the critical/high/medium pattern tiers.
///
/// Document-level scoring counts distinct matching patterns per tier;
/// clause-level scoring is first-match only. The asymmetry is deliberate:
/// a clause is short enough that one hit is signal, a whole document needs
/// corroboration before it is escalated.
pub struct RiskClassifier {
    patterns: Arc<PatternRegistry>,
}

impl RiskClassifier {
    pub fn new(patterns: Arc<PatternRegistry>) -> Self {
        Self { patterns }
    }

    /// Classify a whole document.
    ///
    /// Priority order: any critical match wins; three or more distinct
    /// high patterns escalate to High; a single high match or five or
    /// more distinct medium matches yield Medium; otherwise Low.
    pub fn classify_document(&self, text: &str) -> RiskLevel {
        let critical = count_matches(&self.patterns.critical, text);
        if critical > 0 {
            return RiskLevel::Critical;
        }

        let high = count_matches(&self.patterns.high, text);
        if high >= 3 {
            return RiskLevel::High;
        }

        let medium = count_matches(&self.patterns.medium, text);
        if high >= 1 || medium >= 5 {
            return RiskLevel::Medium;
        }

        RiskLevel::Low
    }

    /// Classify a single clause: the first tier (critical, then high,
    /// then medium) containing any match wins.
    pub fn classify_clause(&self, text: &str) -> RiskLevel {
        let tiers = [
            (&self.patterns.critical, RiskLevel::Critical),
            (&self.patterns.high, RiskLevel::High),
            (&self.patterns.medium, RiskLevel::Medium),
        ];

        for (tier, level) in tiers {
            if tier.iter().any(|p| p.is_match(text)) {
                return level;
            }
        }

        RiskLevel::Low
    }
}

/// Number of distinct patterns in the tier matching anywhere in the text
fn count_matches(tier: &[regex::Regex], text: &str) -> usize {
    tier.iter().filter(|p| p.is_match(text)).count()
}
