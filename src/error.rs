use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfReaderError {
    #[error("Base configuration directory {} does not exist", path.display())]
    BaseDirMissing { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Include cycle detected at {}", path.display())]
    IncludeCycle { path: PathBuf },

    #[error("No section: '{0}'")]
    NoSection(String),

    #[error("No option '{option}' in section '{section}'")]
    NoOption { section: String, option: String },

    #[error("Invalid value for '{option}' in '{section}': {reason}")]
    InvalidValue {
        section: String,
        option: String,
        reason: String,
    },

    #[error("Bad value substitution: '{option}' in '{section}' references unknown '{reference}'")]
    InterpolationMissing {
        section: String,
        option: String,
        reference: String,
    },

    #[error("Value interpolation too deeply recursive: '{option}' in '{section}' (limit {limit})")]
    InterpolationDepth {
        section: String,
        option: String,
        limit: usize,
    },

    #[error("Reader settings error: {0}")]
    Settings(#[from] confique::Error),

    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}
