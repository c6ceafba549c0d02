//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required file does not exist.
    #[error("no configuration file at {}", .0.display())]
    FileNotFound(PathBuf),

    /// A file exists but could not be read.
    #[error("cannot read {}", path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A file or string is not valid in its format.
    #[error("malformed {format} configuration: {message}")]
    Parse {
        /// `toml` or `json`.
        format: &'static str,
        /// Parser diagnostics.
        message: String,
    },

    /// A format other than TOML or JSON was requested.
    #[error("unsupported configuration format '{0}' (expected toml or json)")]
    UnsupportedFormat(String),

    /// The `.env` file exists but is malformed.
    #[error("cannot load .env: {0}")]
    Dotenv(String),

    /// An environment override has an unknown key or an unparsable value.
    #[error("{var}: {reason}")]
    EnvOverride {
        /// The variable name.
        var: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A loaded value fails validation.
    #[error("{field} is invalid: {reason}")]
    InvalidValue {
        /// Dotted field path, e.g. `server.http_addr`.
        field: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn env_override(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvOverride {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Creates an [`InvalidValue`](Self::InvalidValue) error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the offending field for validation errors.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        Self::Parse {
            format: "toml",
            message: error.message().to_string(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse {
            format: "json",
            message: error.to_string(),
        }
    }
}
