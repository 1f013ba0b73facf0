use serde::{Deserialize, Serialize};

use super::dataset::LabeledItem;
use crate::scoring::ScoringResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

impl ConfusionMatrix {
    pub fn record(&mut self, expected: bool, predicted: bool) -> Verdict {
        let verdict = Verdict::from_pair(expected, predicted);
        match verdict {
            Verdict::TruePositive => self.true_positives += 1,
            Verdict::FalsePositive => self.false_positives += 1,
            Verdict::FalseNegative => self.false_negatives += 1,
            Verdict::TrueNegative => self.true_negatives += 1,
        }
        verdict
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.false_negatives + self.true_negatives
    }

    /// Items labeled as leads.
    pub fn positives(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    pub fn negatives(&self) -> usize {
        self.true_negatives + self.false_positives
    }

    /// tp / (tp + fp), 0.0 when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// tp / (tp + fn), 0.0 when nothing is labeled positive.
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.positives())
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    TruePositive,
    FalsePositive,
    FalseNegative,
    TrueNegative,
}

impl Verdict {
    pub fn from_pair(expected: bool, predicted: bool) -> Self {
        match (expected, predicted) {
            (true, true) => Verdict::TruePositive,
            (false, true) => Verdict::FalsePositive,
            (true, false) => Verdict::FalseNegative,
            (false, false) => Verdict::TrueNegative,
        }
    }

    pub fn is_match(self) -> bool {
        matches!(self, Verdict::TruePositive | Verdict::TrueNegative)
    }
}

/// Summary numbers for a report or JSON dump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub total: usize,
    pub positives: usize,
    pub negatives: usize,
}

impl From<&ConfusionMatrix> for Metrics {
    fn from(matrix: &ConfusionMatrix) -> Self {
        Metrics {
            precision: matrix.precision(),
            recall: matrix.recall(),
            f1: matrix.f1(),
            total: matrix.total(),
            positives: matrix.positives(),
            negatives: matrix.negatives(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutcome {
    pub id: String,
    pub expected: bool,
    pub predicted: bool,
    pub score: f64,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub matrix: ConfusionMatrix,
    pub outcomes: Vec<ItemOutcome>,
}

impl Evaluation {
    pub fn metrics(&self) -> Metrics {
        Metrics::from(&self.matrix)
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.verdict.is_match())
    }
}

/// Run `classify_fn(description, company)` over every item and tally the
/// results against the labels.
pub fn evaluate<F>(items: &[LabeledItem], mut classify_fn: F) -> Evaluation
where
    F: FnMut(&str, Option<&str>) -> ScoringResult,
{
    let mut evaluation = Evaluation::default();

    for (index, item) in items.iter().enumerate() {
        let result = classify_fn(&item.description, item.company.as_deref());
        let verdict = evaluation.matrix.record(item.label, result.qualified);
        evaluation.outcomes.push(ItemOutcome {
            id: item.display_id(index),
            expected: item.label,
            predicted: result.qualified,
            score: result.score,
            verdict,
            first_reason: result.reasons.first().map(ToString::to_string),
        });
    }

    evaluation
}

/// Compare a confusion matrix against a pinned baseline. Every deviating
/// count is reported.
pub fn check_baseline(actual: &ConfusionMatrix, expected: &ConfusionMatrix) -> Result<(), Vec<String>> {
    let fields = [
        ("true_positives", actual.true_positives, expected.true_positives),
        ("false_positives", actual.false_positives, expected.false_positives),
        ("false_negatives", actual.false_negatives, expected.false_negatives),
        ("true_negatives", actual.true_negatives, expected.true_negatives),
    ];

    let errors: Vec<String> = fields
        .iter()
        .filter(|(_, got, want)| got != want)
        .map(|(name, got, want)| format!("{}: expected {}, got {}", name, want, got))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
