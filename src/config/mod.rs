mod error;
mod schema;

pub use error::ConfigError;
pub use schema::FilterConfig;

use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use crate::scoring::validate_filter_config;

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/filter-config.json";

/// Top-level keys a config must spell out. A missing safety section is an
/// error, never an empty default.
const REQUIRED_KEYS: &[&str] = &[
    "version",
    "threshold",
    "company_blocklist",
    "required_context",
    "exclusions",
    "positive_signals",
    "design_role_indicators",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from a file extension; anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Json,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Json => write!(f, "JSON"),
            ConfigFormat::Yaml => write!(f, "YAML"),
        }
    }
}

/// Load, normalize and validate a filter config file.
///
/// # Errors
///
/// Returns an error if:
/// - The config file does not exist or cannot be read
/// - The document is not valid JSON/YAML
/// - A required key is missing or has the wrong type
/// - Semantic validation fails (all problems are reported together)
pub fn load_filter_config(path: &Path) -> Result<FilterConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_filter_config(
        &content,
        ConfigFormat::from_path(path),
        &path.display().to_string(),
    )
}

/// Parse a config document. `origin` names the source in error messages.
pub fn parse_filter_config(
    content: &str,
    format: ConfigFormat,
    origin: &str,
) -> Result<FilterConfig, ConfigError> {
    let parse_error = |message: String| ConfigError::Parse {
        origin: origin.to_string(),
        format,
        message,
    };

    let raw: Value = match format {
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        ConfigFormat::Yaml => {
            serde_saphyr::from_str(content).map_err(|e| parse_error(e.to_string()))?
        }
    };

    check_required_keys(&raw, origin)?;

    let mut config: FilterConfig =
        serde_json::from_value(raw).map_err(|e| ConfigError::Schema {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;

    config.normalize();

    validate_filter_config(&config).map_err(|errors| ConfigError::Invalid {
        origin: origin.to_string(),
        errors,
    })?;

    debug!(
        version = %config.version,
        threshold = config.threshold,
        exclusions = config.exclusions.len(),
        tiers = config.positive_signals.len(),
        patterns = config.pattern_count(),
        "loaded filter config from {}",
        origin
    );

    Ok(config)
}

fn check_required_keys(raw: &Value, origin: &str) -> Result<(), ConfigError> {
    let missing = |key: &str| ConfigError::MissingKey {
        origin: origin.to_string(),
        key: key.to_string(),
    };

    let Some(root) = raw.as_object() else {
        return Err(ConfigError::Schema {
            origin: origin.to_string(),
            message: "top level must be a mapping".to_string(),
        });
    };

    if let Some(key) = REQUIRED_KEYS.iter().find(|key| !root.contains_key(**key)) {
        return Err(missing(*key));
    }

    let has_context_patterns = root
        .get("required_context")
        .and_then(Value::as_object)
        .is_some_and(|ctx| ctx.contains_key("patterns"));
    if !has_context_patterns {
        return Err(missing("required_context.patterns"));
    }

    Ok(())
}

/// Lazily loaded, shared filter config.
///
/// The first `get()` loads the file under the lock; later calls hand out the
/// same `Arc`. `reload()` replaces the cached value only when the new load
/// succeeds.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    cached: Mutex<Option<Arc<FilterConfig>>>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Result<Arc<FilterConfig>, ConfigError> {
        // The slot only ever holds a fully loaded config, so a poisoned lock is still consistent.
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(config) = cached.as_ref() {
            return Ok(Arc::clone(config));
        }
        let config = Arc::new(load_filter_config(&self.path)?);
        *cached = Some(Arc::clone(&config));
        Ok(config)
    }

    pub fn reload(&self) -> Result<Arc<FilterConfig>, ConfigError> {
        let config = Arc::new(load_filter_config(&self.path)?);
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(Arc::clone(&config));
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_JSON: &str = r#"{
        "version": "1.0.0",
        "threshold": 50,
        "company_blocklist": ["Boeing"],
        "required_context": {"patterns": ["Solar"]},
        "exclusions": {"tennis": ["tennis"]},
        "positive_signals": [
            {"name": "tier1", "patterns": ["Helioscope"], "weight": 100, "description": "Tool"}
        ],
        "design_role_indicators": ["designer"]
    }"#;

    const VALID_YAML: &str = r#"
version: "1.0.0"
threshold: 50
company_blocklist: [Boeing]
required_context:
  patterns: [Solar]
exclusions:
  tennis: [tennis]
  installer:
    patterns: [installer]
    check_area: title
positive_signals:
  - name: tier1
    patterns: [Helioscope]
    weight: 100
    description: Tool
design_role_indicators: [designer]
"#;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lead-filter-config-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_valid_json() {
        let config = parse_filter_config(VALID_JSON, ConfigFormat::Json, "test").unwrap();
        assert_eq!(config.version, "1.0.0");
        assert_eq!(config.company_blocklist, vec!["boeing"]);
        assert_eq!(config.positive_signals[0].patterns, vec!["helioscope"]);
    }

    #[test]
    fn test_parse_valid_yaml() {
        let config = parse_filter_config(VALID_YAML, ConfigFormat::Yaml, "test").unwrap();
        assert_eq!(config.exclusions.len(), 2);
        assert_eq!(config.required_context.patterns, vec!["solar"]);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("noext")), ConfigFormat::Json);
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_filter_config("{ not json", ConfigFormat::Json, "bad.json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_missing_key_named() {
        let mut raw: Value = serde_json::from_str(VALID_JSON).unwrap();
        raw.as_object_mut().unwrap().remove("exclusions");
        let err =
            parse_filter_config(&raw.to_string(), ConfigFormat::Json, "test").unwrap_err();
        match err {
            ConfigError::MissingKey { key, .. } => assert_eq!(key, "exclusions"),
            other => panic!("expected MissingKey, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_context_patterns() {
        let json = VALID_JSON.replace(r#"{"patterns": ["Solar"]}"#, r#"{"description": "x"}"#);
        let err = parse_filter_config(&json, ConfigFormat::Json, "test").unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingKey { ref key, .. } if key == "required_context.patterns")
        );
    }

    #[test]
    fn test_wrong_type_is_schema_error() {
        let json = VALID_JSON.replace(r#""threshold": 50"#, r#""threshold": "fifty""#);
        let err = parse_filter_config(&json, ConfigFormat::Json, "test").unwrap_err();
        assert!(matches!(err, ConfigError::Schema { .. }));
    }

    #[test]
    fn test_misspelled_exclusion_key_is_schema_error() {
        let json = VALID_JSON.replace(
            r#""tennis": ["tennis"]"#,
            r#""tennis": {"patterns": ["tennis"], "chek_area": "title"}"#,
        );
        let err = parse_filter_config(&json, ConfigFormat::Json, "test").unwrap_err();
        assert!(matches!(err, ConfigError::Schema { .. }));
    }

    #[test]
    fn test_invalid_collects_all_errors() {
        let json = VALID_JSON
            .replace(r#""threshold": 50"#, r#""threshold": -1"#)
            .replace(r#"["designer"]"#, "[]");
        let err = parse_filter_config(&json, ConfigFormat::Json, "test").unwrap_err();
        match err {
            ConfigError::Invalid { errors, .. } => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].starts_with("threshold"));
                assert!(errors[1].starts_with("design_role_indicators"));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_filter_config(Path::new("/nonexistent/filter.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_store_caches_and_reloads() {
        let path = temp_path("store.json");
        fs::write(&path, VALID_JSON).unwrap();

        let store = ConfigStore::new(&path);
        let first = store.get().unwrap();
        let second = store.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        fs::write(&path, VALID_JSON.replace("1.0.0", "1.1.0")).unwrap();
        assert_eq!(store.get().unwrap().version, "1.0.0");
        assert_eq!(store.reload().unwrap().version, "1.1.0");
        assert_eq!(store.get().unwrap().version, "1.1.0");

        // A broken file leaves the cached config in place
        fs::write(&path, "{").unwrap();
        assert!(store.reload().is_err());
        assert_eq!(store.get().unwrap().version, "1.1.0");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_store_survives_poisoned_lock() {
        let path = temp_path("poisoned.json");
        fs::write(&path, VALID_JSON).unwrap();

        let store = ConfigStore::new(&path);
        let cached = store.get().unwrap();
        let panicked = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = store.cached.lock().unwrap();
                    panic!("panic while holding the config lock");
                })
                .join()
                .is_err()
        });
        assert!(panicked);
        assert!(store.cached.is_poisoned());

        assert!(Arc::ptr_eq(&store.get().unwrap(), &cached));
        assert_eq!(store.reload().unwrap().version, "1.0.0");

        let _ = fs::remove_file(&path);
    }
}
