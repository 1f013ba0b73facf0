use std::path::PathBuf;

use thiserror::Error;

use super::ConfigFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file at {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {format} in {origin}: {message}")]
    Parse {
        origin: String,
        format: ConfigFormat,
        message: String,
    },

    #[error("{origin}: missing required key '{key}'")]
    MissingKey { origin: String, key: String },

    #[error("{origin}: {message}")]
    Schema { origin: String, message: String },

    #[error("{origin}: invalid filter config:\n  - {}", .errors.join("\n  - "))]
    Invalid { origin: String, errors: Vec<String> },
}
