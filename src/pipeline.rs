use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::FilterConfig;
use crate::export::RejectedLead;
use crate::scoring::{classify_with_title, ScoringResult};
use crate::stats::FilterStats;

/// One scraped job posting. Only `description` is needed for scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
}

impl Posting {
    fn label(&self, index: usize) -> String {
        self.title
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| format!("#{}", index))
    }
}

/// A posting that passed the filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualifiedLead {
    #[serde(flatten)]
    pub posting: Posting,
    /// Score clamped to 0..=100
    pub confidence: u8,
    pub result: ScoringResult,
}

#[derive(Debug, Default)]
pub struct FilterRun {
    pub qualified: Vec<QualifiedLead>,
    pub rejected: Vec<RejectedLead>,
    pub stats: FilterStats,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("none of the {0} postings has a description; cannot filter")]
    NoDescriptions(usize),

    #[error("failed to read postings from {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid postings JSON in {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a JSON array of postings.
pub fn load_postings(path: &Path) -> Result<Vec<Posting>, PipelineError> {
    let content = fs::read_to_string(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| PipelineError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Classify a posting using its description, company and title.
pub fn classify_posting(posting: &Posting, config: &FilterConfig) -> ScoringResult {
    classify_with_title(
        posting.description.as_deref().unwrap_or_default(),
        posting.company.as_deref(),
        posting.title.as_deref(),
        config,
    )
}

/// Score a batch, splitting it into qualified and rejected postings.
///
/// Postings without a description are skipped and counted, never passed
/// through. A non-empty batch where no posting has a description fails.
pub fn run_filter(postings: Vec<Posting>, config: &FilterConfig) -> Result<FilterRun, PipelineError> {
    if !postings.is_empty() && postings.iter().all(|p| p.description.is_none()) {
        return Err(PipelineError::NoDescriptions(postings.len()));
    }

    let mut run = FilterRun::default();

    for (index, posting) in postings.into_iter().enumerate() {
        if posting.description.is_none() {
            warn!(index, posting = %posting.label(index), "posting has no description, skipping");
            run.stats.record_skipped();
            continue;
        }

        let result = classify_posting(&posting, config);
        run.stats.record(&result);

        if result.qualified {
            run.qualified.push(QualifiedLead {
                confidence: result.confidence(),
                posting,
                result,
            });
        } else {
            run.rejected.push(RejectedLead {
                id: posting.id,
                description: posting.description.unwrap_or_default(),
                company: posting.company,
                title: posting.title,
                result,
            });
        }
    }

    info!(
        processed = run.stats.total_processed,
        qualified = run.stats.total_qualified,
        rejected = run.stats.total_rejected,
        skipped = run.stats.skipped,
        "filter run complete"
    );

    Ok(run)
}
