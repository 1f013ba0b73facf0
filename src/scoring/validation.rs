use std::collections::HashSet;

use crate::config::FilterConfig;

/// Validate a normalized filter configuration.
/// Returns all validation errors at once (not just the first).
pub fn validate_filter_config(config: &FilterConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.version.is_empty() {
        errors.push("version: must not be empty".to_string());
    }

    if !config.threshold.is_finite() || config.threshold <= 0.0 {
        errors.push(format!(
            "threshold: must be a positive number, got {}",
            config.threshold
        ));
    }

    check_patterns("company_blocklist", &config.company_blocklist, &mut errors);

    for (i, signal) in config.company_signals.iter().enumerate() {
        let path = format!("company_signals[{}]", i);
        if signal.name.trim().is_empty() {
            errors.push(format!("{}.name: must not be empty", path));
        }
        check_weight(&path, signal.weight, &mut errors);
        check_patterns(&format!("{}.patterns", path), &signal.patterns, &mut errors);
    }

    check_patterns(
        "required_context.patterns",
        &config.required_context.patterns,
        &mut errors,
    );

    if config.exclusions.is_empty() {
        errors.push("exclusions: at least one category is required".to_string());
    }
    for rule in config.exclusions.iter() {
        check_patterns(
            &format!("exclusions.{}.patterns", rule.category),
            &rule.patterns,
            &mut errors,
        );
    }

    if config.positive_signals.is_empty() {
        errors.push("positive_signals: at least one tier is required".to_string());
    }
    let mut seen_names = HashSet::new();
    for (i, tier) in config.positive_signals.iter().enumerate() {
        let path = format!("positive_signals[{}]", i);
        if tier.name.trim().is_empty() {
            errors.push(format!("{}.name: must not be empty", path));
        } else if !seen_names.insert(tier.name.as_str()) {
            errors.push(format!("{}.name: duplicate tier name '{}'", path, tier.name));
        }
        check_weight(&path, tier.weight, &mut errors);
        check_patterns(&format!("{}.patterns", path), &tier.patterns, &mut errors);
        if let Some(ref co_patterns) = tier.co_patterns {
            check_patterns(&format!("{}.co_patterns", path), co_patterns, &mut errors);
        }
    }

    check_patterns(
        "design_role_indicators",
        &config.design_role_indicators,
        &mut errors,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_weight(path: &str, weight: f64, errors: &mut Vec<String>) {
    if !weight.is_finite() || weight <= 0.0 {
        errors.push(format!("{}.weight: must be positive, got {}", path, weight));
    }
}

fn check_patterns(path: &str, patterns: &[String], errors: &mut Vec<String>) {
    if patterns.is_empty() {
        errors.push(format!("{}: must not be empty", path));
        return;
    }
    for (i, pattern) in patterns.iter().enumerate() {
        // An empty pattern is contained in every text
        if pattern.trim().is_empty() {
            errors.push(format!("{}[{}]: blank pattern", path, i));
        }
    }
}
