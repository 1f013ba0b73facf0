use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::matcher::normalize_patterns;

/// Which part of a posting a rule inspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckArea {
    /// The whole description.
    #[default]
    Description,
    /// Only the title area (leading characters of the description).
    Title,
}

/// Patterns of which at least one must appear before a posting can score.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RequiredContext {
    pub patterns: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Prerequisite a tier needs before its own patterns count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// One of `design_role_indicators` must appear in the description.
    DesignRole,
}

/// Weighted positive-signal tier.
///
/// Example:
/// ```json
/// {
///   "name": "tier3_cad_project",
///   "patterns": ["autocad", "revit"],
///   "co_patterns": ["utility-scale", "rooftop"],
///   "requires": "design_role",
///   "weight": 40,
///   "description": "CAD tool on a solar project type"
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SignalTier {
    pub name: String,

    pub patterns: Vec<String>,

    /// Points added once when the tier matches
    pub weight: f64,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<Requirement>,

    /// Second pattern set; at least one must also appear in the description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_patterns: Option<Vec<String>>,

    #[serde(default)]
    pub check_area: CheckArea,
}

/// Company-level positive signal, e.g. known solar installers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CompanySignal {
    pub name: String,
    pub patterns: Vec<String>,
    pub weight: f64,
    pub description: String,
}

/// Exclusion category as written in a config file.
///
/// Either a bare list of patterns or a detailed rule with a rationale.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ExclusionSpec {
    Patterns(Vec<String>),
    Detailed(DetailedExclusion),
}

/// Object form of an exclusion category.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DetailedExclusion {
    pub patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub check_area: CheckArea,
}

/// A single exclusion category: any pattern hit is a hard disqualification.
#[derive(Debug, Clone, PartialEq)]
pub struct ExclusionRule {
    pub category: String,
    pub patterns: Vec<String>,
    pub rationale: Option<String>,
    pub check_area: CheckArea,
}

impl ExclusionRule {
    /// Human label used in reason trails.
    pub fn label(&self) -> &str {
        self.rationale.as_deref().unwrap_or(&self.category)
    }
}

/// Exclusion categories, kept in category-name order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(
    from = "BTreeMap<String, ExclusionSpec>",
    into = "BTreeMap<String, ExclusionSpec>"
)]
pub struct Exclusions(Vec<ExclusionRule>);

impl Exclusions {
    pub fn iter(&self) -> std::slice::Iter<'_, ExclusionRule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<&ExclusionRule> {
        self.0.iter().find(|rule| rule.category == category)
    }

    pub(crate) fn normalize(&mut self) {
        for rule in &mut self.0 {
            normalize_patterns(&mut rule.patterns);
        }
    }
}

impl From<BTreeMap<String, ExclusionSpec>> for Exclusions {
    fn from(map: BTreeMap<String, ExclusionSpec>) -> Self {
        let rules = map
            .into_iter()
            .map(|(category, spec)| match spec {
                ExclusionSpec::Patterns(patterns) => ExclusionRule {
                    category,
                    patterns,
                    rationale: None,
                    check_area: CheckArea::Description,
                },
                ExclusionSpec::Detailed(DetailedExclusion {
                    patterns,
                    description,
                    check_area,
                }) => ExclusionRule {
                    category,
                    patterns,
                    rationale: description,
                    check_area,
                },
            })
            .collect();
        Exclusions(rules)
    }
}

impl From<Exclusions> for BTreeMap<String, ExclusionSpec> {
    fn from(exclusions: Exclusions) -> Self {
        exclusions
            .0
            .into_iter()
            .map(|rule| {
                let spec = ExclusionSpec::Detailed(DetailedExclusion {
                    patterns: rule.patterns,
                    description: rule.rationale,
                    check_area: rule.check_area,
                });
                (rule.category, spec)
            })
            .collect()
    }
}

impl FromIterator<ExclusionRule> for Exclusions {
    fn from_iter<I: IntoIterator<Item = ExclusionRule>>(iter: I) -> Self {
        let mut rules: Vec<ExclusionRule> = iter.into_iter().collect();
        rules.sort_by(|a, b| a.category.cmp(&b.category));
        Exclusions(rules)
    }
}
