use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry in a scoring audit trail.
///
/// Reasons are produced in evaluation order and each renders to a single
/// human-readable line. Statistics group on the variant, never on the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reason {
    CompanyBlocked {
        entry: String,
        company: String,
    },
    CompanySignal {
        signal: String,
        weight: f64,
        pattern: String,
        description: String,
    },
    NoDescription,
    MissingContext,
    ContextFound {
        in_title: bool,
    },
    Excluded {
        category: String,
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rationale: Option<String>,
    },
    Signal {
        tier: String,
        weight: f64,
        pattern: String,
        description: String,
    },
    DesignRole,
}

impl Reason {
    /// Points this reason contributed. Disqualifications report zero; the
    /// sentinel lives on the score, not on the reason.
    pub fn points(&self) -> f64 {
        match self {
            Reason::CompanySignal { weight, .. } | Reason::Signal { weight, .. } => *weight,
            _ => 0.0,
        }
    }

    pub fn is_disqualifying(&self) -> bool {
        matches!(self, Reason::CompanyBlocked { .. } | Reason::Excluded { .. })
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::CompanyBlocked { entry, company } => {
                write!(f, "Company '{}' in blocklist ({})", company, entry)
            }
            Reason::CompanySignal {
                weight,
                pattern,
                description,
                ..
            }
            | Reason::Signal {
                weight,
                pattern,
                description,
                ..
            } => write!(f, "+{}: {} ({})", weight, description, pattern),
            Reason::NoDescription => write!(f, "No description provided"),
            Reason::MissingContext => {
                write!(f, "Missing required context in title or description")
            }
            Reason::ContextFound { in_title: true } => {
                write!(f, "+0: Has required context in title")
            }
            Reason::ContextFound { in_title: false } => {
                write!(f, "+0: Has required context in description")
            }
            Reason::Excluded {
                category,
                pattern,
                rationale,
            } => write!(
                f,
                "Excluded: {} (matched '{}')",
                rationale.as_deref().unwrap_or(category),
                pattern
            ),
            Reason::DesignRole => write!(f, "+0: Has design role indicator"),
        }
    }
}

/// Why a posting was not qualified, derived from its reason trail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectionCategory {
    CompanyBlocklist,
    MissingContext,
    Excluded(String),
    BelowThreshold,
}

impl RejectionCategory {
    /// First decisive reason wins; anything else scored but fell short.
    pub fn from_reasons(reasons: &[Reason]) -> Self {
        for reason in reasons {
            match reason {
                Reason::CompanyBlocked { .. } => return RejectionCategory::CompanyBlocklist,
                Reason::NoDescription | Reason::MissingContext => {
                    return RejectionCategory::MissingContext
                }
                Reason::Excluded { category, .. } => {
                    return RejectionCategory::Excluded(category.clone())
                }
                _ => {}
            }
        }
        RejectionCategory::BelowThreshold
    }
}

impl fmt::Display for RejectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionCategory::CompanyBlocklist => write!(f, "company_blocklist"),
            RejectionCategory::MissingContext => write!(f, "missing_context"),
            RejectionCategory::Excluded(category) => write!(f, "exclusions.{}", category),
            RejectionCategory::BelowThreshold => write!(f, "below_threshold"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(tier: &str, weight: f64) -> Reason {
        Reason::Signal {
            tier: tier.to_string(),
            weight,
            pattern: "helioscope".to_string(),
            description: "Tier 1 solar design tool".to_string(),
        }
    }

    #[test]
    fn test_signal_display() {
        assert_eq!(
            signal("tier1", 100.0).to_string(),
            "+100: Tier 1 solar design tool (helioscope)"
        );
    }

    #[test]
    fn test_fractional_weight_display() {
        assert_eq!(
            signal("tier1", 12.5).to_string(),
            "+12.5: Tier 1 solar design tool (helioscope)"
        );
    }

    #[test]
    fn test_company_blocked_display() {
        let reason = Reason::CompanyBlocked {
            entry: "boeing".to_string(),
            company: "The Boeing Company".to_string(),
        };
        assert_eq!(
            reason.to_string(),
            "Company 'The Boeing Company' in blocklist (boeing)"
        );
        assert!(reason.is_disqualifying());
        assert_eq!(reason.points(), 0.0);
    }

    #[test]
    fn test_excluded_display_prefers_rationale() {
        let with_rationale = Reason::Excluded {
            category: "tennis".to_string(),
            pattern: "stringer".to_string(),
            rationale: Some("Racquet sports".to_string()),
        };
        let bare = Reason::Excluded {
            category: "tennis".to_string(),
            pattern: "stringer".to_string(),
            rationale: None,
        };
        assert_eq!(
            with_rationale.to_string(),
            "Excluded: Racquet sports (matched 'stringer')"
        );
        assert_eq!(bare.to_string(), "Excluded: tennis (matched 'stringer')");
    }

    #[test]
    fn test_points() {
        assert_eq!(signal("tier2", 50.0).points(), 50.0);
        assert_eq!(Reason::DesignRole.points(), 0.0);
        assert_eq!(Reason::ContextFound { in_title: true }.points(), 0.0);
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_value(Reason::MissingContext).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "missing_context"}));
    }

    #[test]
    fn test_category_company_blocklist() {
        let reasons = vec![Reason::CompanyBlocked {
            entry: "intel".to_string(),
            company: "Intel".to_string(),
        }];
        assert_eq!(
            RejectionCategory::from_reasons(&reasons),
            RejectionCategory::CompanyBlocklist
        );
    }

    #[test]
    fn test_category_exclusion_after_context() {
        let reasons = vec![
            Reason::ContextFound { in_title: false },
            Reason::Excluded {
                category: "sales".to_string(),
                pattern: "account executive".to_string(),
                rationale: None,
            },
        ];
        let category = RejectionCategory::from_reasons(&reasons);
        assert_eq!(category, RejectionCategory::Excluded("sales".to_string()));
        assert_eq!(category.to_string(), "exclusions.sales");
    }

    #[test]
    fn test_category_missing_context() {
        assert_eq!(
            RejectionCategory::from_reasons(&[Reason::NoDescription]).to_string(),
            "missing_context"
        );
        assert_eq!(
            RejectionCategory::from_reasons(&[Reason::MissingContext]),
            RejectionCategory::MissingContext
        );
    }

    #[test]
    fn test_category_below_threshold() {
        let reasons = vec![Reason::ContextFound { in_title: false }, Reason::DesignRole];
        assert_eq!(
            RejectionCategory::from_reasons(&reasons).to_string(),
            "below_threshold"
        );
        assert_eq!(
            RejectionCategory::from_reasons(&[]),
            RejectionCategory::BelowThreshold
        );
    }
}
