use serde::{Deserialize, Serialize};

use super::company::score_company;
use super::reason::{Reason, RejectionCategory};
use super::role::score_role;
use crate::config::FilterConfig;

/// Sentinel score for an absolute disqualification (blocklisted company or
/// exclusion hit). Never mixed with additive points.
pub const DISQUALIFIED: f64 = -100.0;

/// Full audit record for one scored posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub score: f64,
    pub qualified: bool,
    pub company_score: f64,
    pub role_score: f64,
    pub reasons: Vec<Reason>,
    pub threshold: f64,
    pub config_version: String,
}

impl ScoringResult {
    pub fn is_company_blocked(&self) -> bool {
        self.company_score <= DISQUALIFIED
    }

    pub fn is_disqualified(&self) -> bool {
        self.score <= DISQUALIFIED
    }

    /// Human-readable reason lines, in evaluation order.
    pub fn reason_lines(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }

    /// Why the posting was rejected, or `None` when it qualified.
    pub fn rejection_category(&self) -> Option<RejectionCategory> {
        if self.qualified {
            None
        } else {
            Some(RejectionCategory::from_reasons(&self.reasons))
        }
    }

    /// Name of the strongest tier that matched (the first one, since tiers
    /// are listed strongest first).
    pub fn qualification_tier(&self) -> Option<&str> {
        self.reasons.iter().find_map(|reason| match reason {
            Reason::Signal { tier, .. } => Some(tier.as_str()),
            _ => None,
        })
    }

    /// Score clamped into 0..=100 for downstream consumers.
    pub fn confidence(&self) -> u8 {
        self.score.clamp(0.0, 100.0).round() as u8
    }
}

/// Classify a posting from its description and company.
pub fn classify(description: &str, company: Option<&str>, config: &FilterConfig) -> ScoringResult {
    classify_with_title(description, company, None, config)
}

/// Classify a posting, also consulting its title for required context.
///
/// A blocklisted company short-circuits before any role scoring. A role
/// exclusion makes the total the sentinel regardless of company points.
pub fn classify_with_title(
    description: &str,
    company: Option<&str>,
    title: Option<&str>,
    config: &FilterConfig,
) -> ScoringResult {
    let (company_score, mut reasons) = score_company(company, config);

    if company_score <= DISQUALIFIED {
        tracing::trace!(?company, "company blocklisted");
        return ScoringResult {
            score: DISQUALIFIED,
            qualified: false,
            company_score,
            role_score: 0.0,
            reasons,
            threshold: config.threshold,
            config_version: config.version.clone(),
        };
    }

    let (role_score, role_reasons) = score_role(description, title, config);
    // Failing the context gate zeroes the score, company signals included.
    let gated = role_reasons
        .iter()
        .any(|r| matches!(r, Reason::MissingContext | Reason::NoDescription));
    reasons.extend(role_reasons);

    let score = if role_score <= DISQUALIFIED {
        DISQUALIFIED
    } else if gated {
        0.0
    } else {
        company_score + role_score
    };
    let qualified = score >= config.threshold;

    tracing::trace!(score, qualified, reasons = reasons.len(), "classified posting");

    ScoringResult {
        score,
        qualified,
        company_score,
        role_score,
        reasons,
        threshold: config.threshold,
        config_version: config.version.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::test_support::sample_config;
    use crate::scoring::CompanySignal;

    #[test]
    fn test_qualified_at_threshold() {
        let mut config = sample_config();
        config.threshold = 100.0;
        let result = classify("Solar project modeling with Helioscope", None, &config);
        assert_eq!(result.score, 100.0);
        assert!(result.qualified, "threshold is inclusive");
        assert_eq!(result.rejection_category(), None);
        assert_eq!(result.qualification_tier(), Some("tools"));
        assert_eq!(result.config_version, config.version);
    }

    #[test]
    fn test_below_threshold() {
        let config = sample_config();
        let result = classify("Solar designer, AutoCAD exposure", Some("Sunrun"), &config);
        assert_eq!(result.score, 25.0);
        assert!(!result.qualified);
        assert_eq!(
            result.rejection_category(),
            Some(RejectionCategory::BelowThreshold)
        );
    }

    #[test]
    fn test_company_block_short_circuits() {
        let config = sample_config();
        let result = classify(
            "Solar designer using Helioscope and AutoCAD for rooftop arrays",
            Some("The Boeing Company"),
            &config,
        );
        assert_eq!(result.score, DISQUALIFIED);
        assert_eq!(result.role_score, 0.0);
        assert!(result.is_company_blocked());
        assert_eq!(result.reasons.len(), 1);
        assert_eq!(
            result.rejection_category(),
            Some(RejectionCategory::CompanyBlocklist)
        );
    }

    #[test]
    fn test_role_exclusion_overrides_company_points() {
        let mut config = sample_config();
        config.company_signals.push(CompanySignal {
            name: "solar".to_string(),
            patterns: vec!["solar".to_string()],
            weight: 30.0,
            description: "Solar company".to_string(),
        });
        let result = classify(
            "Solar tennis club stringer",
            Some("Solar Racquet Club"),
            &config,
        );
        assert_eq!(result.company_score, 30.0);
        assert_eq!(result.role_score, DISQUALIFIED);
        assert_eq!(result.score, DISQUALIFIED);
        assert!(!result.is_company_blocked());
        assert!(result.is_disqualified());
        assert_eq!(
            result.rejection_category().map(|c| c.to_string()),
            Some("exclusions.tennis".to_string())
        );
    }

    #[test]
    fn test_missing_context_ignores_company_points() {
        let mut config = sample_config();
        config.company_signals.push(CompanySignal {
            name: "installer".to_string(),
            patterns: vec!["sunrun".to_string()],
            weight: 60.0,
            description: "Residential solar installer".to_string(),
        });
        let result = classify("Receptionist, answer phones", Some("Sunrun"), &config);
        assert_eq!(result.company_score, 60.0);
        assert_eq!(result.score, 0.0);
        assert!(!result.qualified);
        assert_eq!(
            result.rejection_category(),
            Some(RejectionCategory::MissingContext)
        );

        let result = classify("", Some("Sunrun"), &config);
        assert_eq!(result.score, 0.0);
        assert!(!result.qualified);
    }

    #[test]
    fn test_missing_description_is_rejected_not_error() {
        let config = sample_config();
        let result = classify("", Some("Sunrun"), &config);
        assert_eq!(result.score, 0.0);
        assert!(!result.qualified);
        assert_eq!(result.reason_lines(), vec!["No description provided"]);
    }

    #[test]
    fn test_title_supplies_context() {
        let config = sample_config();
        let without = classify("Designer using Helioscope", None, &config);
        assert_eq!(without.score, 0.0);

        let with = classify_with_title(
            "Designer using Helioscope",
            None,
            Some("Solar Designer"),
            &config,
        );
        assert_eq!(with.score, 100.0);
    }

    #[test]
    fn test_confidence_clamped() {
        let config = sample_config();
        let strong = classify(
            "Solar designer using Helioscope and AutoCAD for rooftop arrays",
            None,
            &config,
        );
        assert_eq!(strong.score, 165.0);
        assert_eq!(strong.confidence(), 100);

        let blocked = classify("Solar", Some("Boeing"), &config);
        assert_eq!(blocked.confidence(), 0);
    }

    #[test]
    fn test_deterministic() {
        let config = sample_config();
        let description = "Solar designer using Helioscope and AutoCAD for rooftop arrays";
        assert_eq!(
            classify(description, Some("Sunrun"), &config),
            classify(description, Some("Sunrun"), &config)
        );
    }

    #[test]
    fn test_result_serializes_reasons() {
        let config = sample_config();
        let result = classify("Solar project modeling with Helioscope", None, &config);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["qualified"], true);
        assert_eq!(json["reasons"][1]["kind"], "signal");
        assert_eq!(json["reasons"][1]["tier"], "tools");
    }
}
