use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::evaluation::LabeledItem;
use crate::scoring::{RejectionCategory, ScoringResult};

/// Default cap on exported rejections per run.
pub const DEFAULT_MAX_EXPORT: usize = 100;

const COMPANY_ID_CHARS: usize = 20;

/// A rejected posting kept for human review.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedLead {
    pub id: Option<String>,
    pub description: String,
    pub company: Option<String>,
    pub title: Option<String>,
    pub result: ScoringResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub created: DateTime<Utc>,
    pub purpose: String,
    pub run_id: String,
    pub count: usize,
    pub total_rejected: usize,
    pub notes: String,
}

impl ExportMetadata {
    pub fn new(run_id: impl Into<String>, count: usize, total_rejected: usize) -> Self {
        Self {
            created: Utc::now(),
            purpose: "labeling_review".to_string(),
            run_id: run_id.into(),
            count,
            total_rejected,
            notes: "Review and change label to true for any false negatives".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LabeledExport<'a> {
    metadata: &'a ExportMetadata,
    items: &'a [LabeledItem],
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Convert up to `max_count` rejections into labeled items.
///
/// The label is the system verdict (`false`); a reviewer flips it for false
/// negatives. Text fields are copied verbatim.
pub fn export_rejected(rejected: &[RejectedLead], max_count: usize) -> Vec<LabeledItem> {
    rejected
        .iter()
        .take(max_count)
        .enumerate()
        .map(|(index, lead)| {
            let category = RejectionCategory::from_reasons(&lead.result.reasons);
            LabeledItem {
                id: Some(
                    lead.id
                        .clone()
                        .unwrap_or_else(|| fallback_id(index + 1, lead.company.as_deref())),
                ),
                description: lead.description.clone(),
                label: false,
                company: lead.company.clone(),
                title: lead.title.clone(),
                notes: Some(format!(
                    "rejected: {} (score: {})",
                    category, lead.result.score
                )),
            }
        })
        .collect()
}

fn fallback_id(position: usize, company: Option<&str>) -> String {
    let slug: String = company
        .unwrap_or_default()
        .trim()
        .chars()
        .take(COMPANY_ID_CHARS)
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if slug.is_empty() {
        format!("rejected_{:03}", position)
    } else {
        format!("rejected_{:03}_{}", position, slug)
    }
}

/// Write a `{metadata, items}` document in the labeled-data format.
pub fn write_labeled_export(
    path: &Path,
    items: &[LabeledItem],
    metadata: &ExportMetadata,
) -> Result<(), ExportError> {
    write_json_atomic(path, &LabeledExport { metadata, items })
}

/// Serialize `value` as pretty JSON and replace `path` atomically.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut file = AtomicWriteFile::open(path).map_err(io_error)?;
    serde_json::to_writer_pretty(&mut file, value).map_err(|source| ExportError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    file.commit().map_err(io_error)?;

    tracing::debug!(path = %path.display(), "wrote export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::load_labeled_file;
    use crate::scoring::classify_with_title;
    use crate::scoring::test_support::sample_config;

    fn rejected(id: Option<&str>, description: &str, company: Option<&str>) -> RejectedLead {
        let config = sample_config();
        let title = Some("Solar Technician");
        RejectedLead {
            id: id.map(str::to_string),
            description: description.to_string(),
            company: company.map(str::to_string),
            title: title.map(str::to_string),
            result: classify_with_title(description, company, title, &config),
        }
    }

    #[test]
    fn test_export_fields() {
        let leads = vec![rejected(Some("job-7"), "Solar tennis coach", None)];
        let items = export_rejected(&leads, DEFAULT_MAX_EXPORT);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_deref(), Some("job-7"));
        assert!(!items[0].label);
        assert_eq!(
            items[0].notes.as_deref(),
            Some("rejected: exclusions.tennis (score: -100)")
        );
    }

    #[test]
    fn test_export_cap() {
        let leads: Vec<_> = (0..5)
            .map(|_| rejected(None, "Roofing crew", None))
            .collect();
        assert_eq!(export_rejected(&leads, 3).len(), 3);
        assert!(export_rejected(&leads, 0).is_empty());
    }

    #[test]
    fn test_fallback_ids() {
        let leads = vec![
            rejected(None, "Solar stuff", Some("The Boeing Company of Chicago Illinois")),
            rejected(None, "Roofing crew", None),
        ];
        let items = export_rejected(&leads, DEFAULT_MAX_EXPORT);
        assert_eq!(items[0].id.as_deref(), Some("rejected_001_the_boeing_company_o"));
        assert_eq!(items[1].id.as_deref(), Some("rejected_002"));
        assert_eq!(
            items[0].notes.as_deref(),
            Some("rejected: company_blocklist (score: -100)")
        );
    }

    #[test]
    fn test_long_description_preserved() {
        let description = format!("Solar tennis coach. {}", "x".repeat(5000));
        let items = export_rejected(&[rejected(None, &description, None)], 10);
        assert_eq!(items[0].description, description);
    }

    #[test]
    fn test_write_and_reimport_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "lead-filter-export-{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        let leads = vec![
            rejected(Some("a"), "Solar tennis coach", Some("Racquet Club")),
            rejected(Some("b"), "Solar designer, AutoCAD exposure", Some("Sunrun")),
        ];
        let items = export_rejected(&leads, DEFAULT_MAX_EXPORT);
        let metadata = ExportMetadata::new("20260101_120000", items.len(), leads.len());
        write_labeled_export(&path, &items, &metadata).unwrap();

        let dataset = load_labeled_file(&path).unwrap();
        assert_eq!(dataset.items, items);
        assert_eq!(dataset.metadata["purpose"], "labeling_review");
        assert_eq!(dataset.metadata["count"], 2);
        for (item, lead) in dataset.items.iter().zip(&leads) {
            assert_eq!(item.description, lead.description);
            assert_eq!(item.company, lead.company);
            assert_eq!(item.title, lead.title);
            assert!(!item.label);
        }

        let _ = fs::remove_file(&path);
    }
}
