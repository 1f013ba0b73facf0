use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::config::FilterConfig;
use crate::evaluation::{Evaluation, ItemOutcome};
use crate::pipeline::QualifiedLead;
use crate::scoring::ScoringResult;
use crate::stats::FilterStats;

const RULE_WIDTH: usize = 60;
const SECTION_WIDTH: usize = 40;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Whole scores print without decimals ("100", "-100"), others with one ("12.5")
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{:.1}", score)
    }
}

/// Format a 0..=1 fraction as a percentage with two decimals
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Truncate to `max_width` characters, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Verdict line followed by the reason trail
pub fn format_score_result(result: &ScoringResult, use_colors: bool) -> String {
    let verdict = if result.qualified { "QUALIFIED" } else { "REJECTED" };
    let detail = format!(
        "score {} (threshold {}, company {}, role {})",
        format_score(result.score),
        format_score(result.threshold),
        format_score(result.company_score),
        format_score(result.role_score)
    );

    let mut lines = Vec::new();
    let category = result
        .rejection_category()
        .map(|c| format!(" [{}]", c))
        .unwrap_or_default();
    if use_colors {
        let verdict = if result.qualified {
            verdict.green().bold().to_string()
        } else {
            verdict.red().bold().to_string()
        };
        lines.push(format!("{} {}{}", verdict, detail, category.dimmed()));
    } else {
        lines.push(format!("{} {}{}", verdict, detail, category));
    }

    for reason in &result.reasons {
        lines.push(format!("  - {}", reason));
    }
    lines.push(format!("  config version {}", result.config_version));

    lines.join("\n")
}

/// Per-item MATCH/MISMATCH listing
pub fn format_item_outcomes(outcomes: &[ItemOutcome], use_colors: bool) -> String {
    outcomes
        .iter()
        .map(|outcome| {
            let status = if outcome.verdict.is_match() {
                "MATCH"
            } else {
                "MISMATCH"
            };
            let line = format!(
                "  [{}] {}: expected={}, predicted={} (score {})",
                status,
                outcome.id,
                outcome.expected,
                outcome.predicted,
                format_score(outcome.score)
            );
            match (use_colors, outcome.verdict.is_match()) {
                (true, true) => line.dimmed().to_string(),
                (true, false) => line.yellow().to_string(),
                (false, _) => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain-text evaluation report: metrics, dataset, confusion matrix, interpretation
pub fn format_evaluation_report(evaluation: &Evaluation, source: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let section = "-".repeat(SECTION_WIDTH);
    let metrics = evaluation.metrics();
    let m = &evaluation.matrix;

    let mut out = Vec::new();
    out.push(String::new());
    out.push(rule.clone());
    out.push(format!("EVALUATION REPORT: {}", source));
    out.push(rule.clone());
    out.push(String::new());

    out.push("METRICS".to_string());
    out.push(section.clone());
    out.push(format!("  Precision: {}", format_percent(metrics.precision)));
    out.push(format!("  Recall:    {}", format_percent(metrics.recall)));
    out.push(format!("  F1 Score:  {}", format_percent(metrics.f1)));
    out.push(String::new());

    out.push("DATASET".to_string());
    out.push(section.clone());
    out.push(format!("  Total items:  {}", metrics.total));
    out.push(format!("  Positives:    {} (labeled as qualified)", metrics.positives));
    out.push(format!("  Negatives:    {} (labeled as rejected)", metrics.negatives));
    out.push(String::new());

    out.push("CONFUSION MATRIX".to_string());
    out.push(section.clone());
    out.push(String::new());
    out.push("                      Predicted".to_string());
    out.push("                  Reject    Qualify".to_string());
    out.push(format!(
        "  Actual Reject   {:>6}    {:>6}  (TN, FP)",
        m.true_negatives, m.false_positives
    ));
    out.push(format!(
        "  Actual Qualify  {:>6}    {:>6}  (FN, TP)",
        m.false_negatives, m.true_positives
    ));
    out.push(String::new());

    out.push("INTERPRETATION".to_string());
    out.push(section);
    out.push(format!(
        "  True Positives:  {:>4} (correctly identified as qualified)",
        m.true_positives
    ));
    out.push(format!(
        "  False Positives: {:>4} (incorrectly identified as qualified)",
        m.false_positives
    ));
    out.push(format!(
        "  False Negatives: {:>4} (missed qualified leads)",
        m.false_negatives
    ));
    out.push(format!(
        "  True Negatives:  {:>4} (correctly rejected)",
        m.true_negatives
    ));
    out.push(String::new());
    out.push(rule);

    out.join("\n")
}

/// Run statistics with the most common rejection categories
pub fn format_filter_stats(stats: &FilterStats, use_colors: bool) -> String {
    let mut lines = vec![
        format!("Processed: {}", stats.total_processed),
        format!(
            "Qualified: {} ({})",
            stats.total_qualified,
            format_percent(stats.pass_rate())
        ),
        format!("Rejected:  {}", stats.total_rejected),
        format!("Company blocked: {}", stats.company_blocked),
    ];
    if stats.skipped > 0 {
        let line = format!("Skipped (no description): {}", stats.skipped);
        lines.push(if use_colors {
            line.yellow().to_string()
        } else {
            line
        });
    }

    if !stats.qualification_tiers.is_empty() {
        lines.push("Qualification tiers:".to_string());
        for (tier, count) in &stats.qualification_tiers {
            lines.push(format!("  {:>5}  {}", count, tier));
        }
    }

    let top = stats.top_rejections(crate::stats::TOP_REJECTIONS);
    if !top.is_empty() {
        lines.push("Top rejection reasons:".to_string());
        for (category, count) in top {
            lines.push(format!("  {:>5}  {}", count, category));
        }
    }

    lines.join("\n")
}

/// Qualified leads as a table: index, confidence, title, company
pub fn format_qualified_list(leads: &[QualifiedLead], use_colors: bool) -> String {
    if leads.is_empty() {
        return "No qualified leads.".to_string();
    }

    leads
        .iter()
        .enumerate()
        .map(|(idx, lead)| {
            let index_str = format!("{:>3}.", idx + 1);
            let confidence = format!("{:>3}", lead.confidence);
            let title = truncate(lead.posting.title.as_deref().unwrap_or("(untitled)"), 50);
            let company = lead.posting.company.as_deref().unwrap_or("-");
            let tier = lead.result.qualification_tier().unwrap_or("unknown");
            if use_colors {
                format!(
                    "{} {}  {}  {}  {}",
                    index_str.dimmed(),
                    confidence.bold(),
                    title,
                    company.cyan(),
                    tier.dimmed()
                )
            } else {
                format!("{} {}  {}  {}  {}", index_str, confidence, title, company, tier)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-screen overview of a loaded config
pub fn format_config_summary(config: &FilterConfig) -> String {
    let mut lines = vec![
        format!("Config version: {}", config.version),
        format!("Threshold: {}", format_score(config.threshold)),
        format!("Match mode: {:?}", config.match_mode),
        format!("Blocklisted companies: {}", config.company_blocklist.len()),
        format!("Required context patterns: {}", config.required_context.patterns.len()),
        format!("Exclusion categories: {}", config.exclusions.len()),
    ];
    for rule in config.exclusions.iter() {
        lines.push(format!(
            "  {} ({} patterns, {:?}): {}",
            rule.category,
            rule.patterns.len(),
            rule.check_area,
            rule.label()
        ));
    }
    lines.push(format!("Positive tiers: {}", config.positive_signals.len()));
    for tier in &config.positive_signals {
        let requires = if tier.requires.is_some() {
            ", requires design role"
        } else {
            ""
        };
        lines.push(format!(
            "  {} +{} ({} patterns{})",
            tier.name,
            format_score(tier.weight),
            tier.patterns.len(),
            requires
        ));
    }
    lines.push(format!("Total patterns: {}", config.pattern_count()));
    lines.join("\n")
}
