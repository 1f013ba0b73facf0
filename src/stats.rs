use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scoring::ScoringResult;

/// Tier name recorded when a qualified result carries no signal reason.
pub const UNKNOWN_TIER: &str = "unknown";

/// Number of rejection categories kept in a run summary.
pub const TOP_REJECTIONS: usize = 10;

/// Counters for one filter run. One instance per worker; combine with `merge`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub total_processed: usize,
    pub total_qualified: usize,
    pub total_rejected: usize,
    pub company_blocked: usize,
    /// Postings that carried no description and were never scored
    pub skipped: usize,
    pub rejection_categories: BTreeMap<String, usize>,
    pub qualification_tiers: BTreeMap<String, usize>,
}

impl FilterStats {
    pub fn record_qualified(&mut self, tier: &str) {
        self.total_processed += 1;
        self.total_qualified += 1;
        *self.qualification_tiers.entry(tier.to_string()).or_default() += 1;
    }

    pub fn record_rejected(&mut self, category: &str, company_blocked: bool) {
        self.total_processed += 1;
        self.total_rejected += 1;
        *self
            .rejection_categories
            .entry(category.to_string())
            .or_default() += 1;
        if company_blocked {
            self.company_blocked += 1;
        }
    }

    /// Record a result, deriving tier or category from its reasons.
    pub fn record(&mut self, result: &ScoringResult) {
        match result.rejection_category() {
            None => self.record_qualified(result.qualification_tier().unwrap_or(UNKNOWN_TIER)),
            Some(category) => {
                self.record_rejected(&category.to_string(), result.is_company_blocked())
            }
        }
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn merge(&mut self, other: &FilterStats) {
        self.total_processed += other.total_processed;
        self.total_qualified += other.total_qualified;
        self.total_rejected += other.total_rejected;
        self.company_blocked += other.company_blocked;
        self.skipped += other.skipped;
        for (category, count) in &other.rejection_categories {
            *self.rejection_categories.entry(category.clone()).or_default() += count;
        }
        for (tier, count) in &other.qualification_tiers {
            *self.qualification_tiers.entry(tier.clone()).or_default() += count;
        }
    }

    /// Fraction of processed postings that qualified, in 0.0..=1.0.
    pub fn pass_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            self.total_qualified as f64 / self.total_processed as f64
        }
    }

    /// Most frequent rejection categories, count descending then name.
    pub fn top_rejections(&self, n: usize) -> Vec<(&str, usize)> {
        let mut sorted: Vec<(&str, usize)> = self
            .rejection_categories
            .iter()
            .map(|(category, count)| (category.as_str(), *count))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        sorted.truncate(n);
        sorted
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            total_processed: self.total_processed,
            qualified: self.total_qualified,
            rejected: self.total_rejected,
            skipped: self.skipped,
            pass_rate: self.pass_rate(),
            company_blocked: self.company_blocked,
            rejection_reasons: self
                .top_rejections(TOP_REJECTIONS)
                .into_iter()
                .map(|(category, count)| RejectionCount {
                    category: category.to_string(),
                    count,
                })
                .collect(),
            qualification_tiers: self.qualification_tiers.clone(),
        }
    }
}

/// Run statistics as written to the stats export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total_processed: usize,
    pub qualified: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub pass_rate: f64,
    pub company_blocked: usize,
    pub rejection_reasons: Vec<RejectionCount>,
    pub qualification_tiers: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectionCount {
    pub category: String,
    pub count: usize,
}
