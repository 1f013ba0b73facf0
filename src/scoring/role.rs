use super::config::{CheckArea, Requirement};
use super::engine::DISQUALIFIED;
use super::matcher::title_area;
use super::reason::Reason;
use crate::config::FilterConfig;

/// Score based on role/description signals only.
///
/// Evaluation order:
/// 1. required context gate (description or title); failing it scores zero
/// 2. exclusion scan; the first category hit returns the disqualification sentinel
/// 3. positive tiers in config order, each adding its weight once
///
/// Exclusions always run before any tier, so they dominate positive signals.
pub fn score_role(
    description: &str,
    title: Option<&str>,
    config: &FilterConfig,
) -> (f64, Vec<Reason>) {
    if description.trim().is_empty() {
        return (0.0, vec![Reason::NoDescription]);
    }

    let mode = config.match_mode;
    let desc_lower = description.to_lowercase();
    let title_lower = title.map(str::to_lowercase).unwrap_or_default();
    let title_text = title_area(&desc_lower);

    let required = &config.required_context.patterns;
    let in_title = !title_lower.is_empty() && mode.any(&title_lower, required);
    if !in_title && !mode.any(&desc_lower, required) {
        return (0.0, vec![Reason::MissingContext]);
    }

    let mut reasons = vec![Reason::ContextFound { in_title }];

    for rule in config.exclusions.iter() {
        let text = match rule.check_area {
            CheckArea::Title => title_text,
            CheckArea::Description => desc_lower.as_str(),
        };
        if let Some(pattern) = mode.find(text, &rule.patterns) {
            reasons.push(Reason::Excluded {
                category: rule.category.clone(),
                pattern: pattern.to_string(),
                rationale: rule.rationale.clone(),
            });
            return (DISQUALIFIED, reasons);
        }
    }

    let has_design_role = mode.any(&desc_lower, &config.design_role_indicators);
    let mut score = 0.0;

    for tier in &config.positive_signals {
        if tier.requires == Some(Requirement::DesignRole) && !has_design_role {
            continue;
        }
        let text = match tier.check_area {
            CheckArea::Title => title_text,
            CheckArea::Description => desc_lower.as_str(),
        };
        let Some(pattern) = mode.find(text, &tier.patterns) else {
            continue;
        };
        if let Some(ref co_patterns) = tier.co_patterns {
            if !mode.any(&desc_lower, co_patterns) {
                continue;
            }
        }

        score += tier.weight;
        reasons.push(Reason::Signal {
            tier: tier.name.clone(),
            weight: tier.weight,
            pattern: pattern.to_string(),
            description: tier.description.clone(),
        });
    }

    if has_design_role {
        reasons.push(Reason::DesignRole);
    }

    (score, reasons)
}
