use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::metrics::ConfusionMatrix;

/// One hand-labeled posting. `label` is true when the posting is a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub description: String,
    pub label: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LabeledItem {
    /// Identifier for reports: explicit id, then company, then 1-based position.
    pub fn display_id(&self, index: usize) -> String {
        self.id
            .clone()
            .or_else(|| self.company.clone())
            .unwrap_or_else(|| format!("item_{}", index + 1))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledDataset {
    pub metadata: Map<String, Value>,
    pub items: Vec<LabeledItem>,
}

impl LabeledDataset {
    /// Pinned confusion matrix from `metadata.baseline`, if the file carries one.
    pub fn baseline(&self) -> Result<Option<ConfusionMatrix>, DatasetError> {
        match self.metadata.get("baseline") {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(DatasetError::InvalidBaseline),
        }
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {origin}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected object or array at root of {origin}, got {found}")]
    UnexpectedRoot { origin: String, found: &'static str },

    #[error("item {index} (id: {id}) in {origin} is not an object")]
    InvalidItem {
        origin: String,
        index: usize,
        id: String,
    },

    #[error("item {index} (id: {id}) in {origin} missing required '{field}' field")]
    MissingField {
        origin: String,
        index: usize,
        id: String,
        field: &'static str,
    },

    #[error("item {index} (id: {id}) in {origin} '{field}' must be {expected}, got {found}")]
    InvalidField {
        origin: String,
        index: usize,
        id: String,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid glob pattern '{pattern}'")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("no labeled files (*.json) found in {}", .0.display())]
    NoFiles(PathBuf),

    #[error("invalid baseline in metadata")]
    InvalidBaseline(#[source] serde_json::Error),
}

/// Load one labeled file in wrapped (`{metadata, items}`) or bare-array form.
pub fn load_labeled_file(path: &Path) -> Result<LabeledDataset, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_labeled_json(&content, &path.display().to_string())
}

/// Parse a labeled document. Labels must be real booleans; nothing is coerced.
pub fn parse_labeled_json(content: &str, origin: &str) -> Result<LabeledDataset, DatasetError> {
    let root: Value = serde_json::from_str(content).map_err(|source| DatasetError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    let (metadata, raw_items) = match root {
        Value::Object(mut object) => {
            let metadata = match object.remove("metadata") {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            let items = match object.remove("items") {
                Some(Value::Array(items)) => items,
                None | Some(Value::Null) => Vec::new(),
                Some(other) => {
                    return Err(DatasetError::UnexpectedRoot {
                        origin: format!("{} (items)", origin),
                        found: type_name(&other),
                    })
                }
            };
            (metadata, items)
        }
        Value::Array(items) => (Map::new(), items),
        other => {
            return Err(DatasetError::UnexpectedRoot {
                origin: origin.to_string(),
                found: type_name(&other),
            })
        }
    };

    let items = raw_items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| parse_item(raw, index, origin))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LabeledDataset { metadata, items })
}

/// Load every `*.json` file in `dir`, concatenated in path order.
pub fn load_labeled_dir(dir: &Path) -> Result<LabeledDataset, DatasetError> {
    let pattern = dir.join("*.json").display().to_string();
    let entries = glob::glob(&pattern).map_err(|source| DatasetError::Glob {
        pattern: pattern.clone(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries.filter_map(Result::ok).collect();
    paths.sort();
    if paths.is_empty() {
        return Err(DatasetError::NoFiles(dir.to_path_buf()));
    }

    let mut merged = LabeledDataset::default();
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let dataset = load_labeled_file(path)?;
        tracing::debug!(file = %path.display(), items = dataset.items.len(), "loaded labeled file");
        merged.items.extend(dataset.items);
        files.push(Value::String(path.display().to_string()));
    }
    merged.metadata.insert("files".to_string(), Value::Array(files));

    Ok(merged)
}

fn parse_item(raw: Value, index: usize, origin: &str) -> Result<LabeledItem, DatasetError> {
    let Value::Object(object) = raw else {
        return Err(DatasetError::InvalidItem {
            origin: origin.to_string(),
            index,
            id: "<none>".to_string(),
        });
    };

    let id = match object.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let shown_id = id.clone().unwrap_or_else(|| "<none>".to_string());

    let missing = |field| DatasetError::MissingField {
        origin: origin.to_string(),
        index,
        id: shown_id.clone(),
        field,
    };
    let invalid = |field, expected, value: &Value| DatasetError::InvalidField {
        origin: origin.to_string(),
        index,
        id: shown_id.clone(),
        field,
        expected,
        found: type_name(value),
    };

    let description = match object.get("description") {
        None => return Err(missing("description")),
        Some(Value::String(s)) => s.clone(),
        Some(other) => return Err(invalid("description", "a string", other)),
    };
    let label = match object.get("label") {
        None => return Err(missing("label")),
        Some(Value::Bool(b)) => *b,
        Some(other) => return Err(invalid("label", "boolean", other)),
    };

    let optional = |field: &'static str| match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(field, "a string", other)),
    };

    Ok(LabeledItem {
        id,
        description,
        label,
        company: optional("company")?,
        title: optional("title")?,
        notes: optional("notes")?,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
