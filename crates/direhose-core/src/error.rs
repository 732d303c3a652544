//! Error types for configuration loading.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a run before the walk starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Permission denied reading the config file.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic I/O error while reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A recognized key carries a value that cannot be used.
    #[error("Invalid value for `{key}`: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The assembled configuration is inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ConfigError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid-value error for a config key.
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Kind of config line problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// The line has no `=` separator.
    MissingSeparator,
    /// The key is empty once whitespace is trimmed.
    EmptyKey,
}

/// A config line that was skipped while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigWarning {
    /// 1-based line number in the config file.
    pub line: usize,
    /// The offending line, trimmed.
    pub content: String,
    /// What was wrong with it.
    pub kind: WarningKind,
}

impl ConfigWarning {
    /// Create a new config warning.
    pub fn new(line: usize, content: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            line,
            content: content.into(),
            kind,
        }
    }

    /// Human-readable description of the problem.
    pub fn message(&self) -> String {
        match self.kind {
            WarningKind::MissingSeparator => {
                format!("line {}: expected `key=value`, got {:?}", self.line, self.content)
            }
            WarningKind::EmptyKey => format!("line {}: empty key in {:?}", self.line, self.content),
        }
    }
}
