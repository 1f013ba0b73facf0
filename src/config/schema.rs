use serde::{Deserialize, Serialize};

use crate::scoring::matcher::normalize_patterns;
use crate::scoring::{CompanySignal, Exclusions, MatchMode, RequiredContext, SignalTier};

/// The complete rule set for one run. Loaded once and never mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Ruleset version, copied into every result for auditing
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Minimum score for a posting to qualify (inclusive)
    pub threshold: f64,

    #[serde(default)]
    pub match_mode: MatchMode,

    /// Company-name substrings that disqualify a posting outright
    pub company_blocklist: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub company_signals: Vec<CompanySignal>,

    pub required_context: RequiredContext,

    pub exclusions: Exclusions,

    /// Positive tiers, strongest first
    pub positive_signals: Vec<SignalTier>,

    pub design_role_indicators: Vec<String>,
}

impl FilterConfig {
    /// Trim and lowercase every pattern so matching can compare against
    /// lowercased text directly.
    pub fn normalize(&mut self) {
        self.version = self.version.trim().to_string();
        normalize_patterns(&mut self.company_blocklist);
        for signal in &mut self.company_signals {
            normalize_patterns(&mut signal.patterns);
        }
        normalize_patterns(&mut self.required_context.patterns);
        self.exclusions.normalize();
        for tier in &mut self.positive_signals {
            normalize_patterns(&mut tier.patterns);
            if let Some(co_patterns) = tier.co_patterns.as_mut() {
                normalize_patterns(co_patterns);
            }
        }
        normalize_patterns(&mut self.design_role_indicators);
    }

    pub fn tier(&self, name: &str) -> Option<&SignalTier> {
        self.positive_signals.iter().find(|tier| tier.name == name)
    }

    /// Total number of patterns across every rule.
    pub fn pattern_count(&self) -> usize {
        self.company_blocklist.len()
            + self
                .company_signals
                .iter()
                .map(|s| s.patterns.len())
                .sum::<usize>()
            + self.required_context.patterns.len()
            + self.exclusions.iter().map(|r| r.patterns.len()).sum::<usize>()
            + self
                .positive_signals
                .iter()
                .map(|t| t.patterns.len() + t.co_patterns.as_ref().map_or(0, Vec::len))
                .sum::<usize>()
            + self.design_role_indicators.len()
    }
}
