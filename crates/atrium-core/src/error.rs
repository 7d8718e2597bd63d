//! Error types for atrium-core

use thiserror::Error;

/// Result type alias using atrium-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Atrium
#[derive(Error, Debug)]
pub enum Error {
    /// Filter identifier failed validation (`^[A-Za-z0-9_-]+$`)
    #[error("Invalid filter id: '{id}' (allowed: letters, digits, '_', '-')")]
    InvalidFilterId { id: String },

    /// Requested module/theme is absent from the resolved source
    #[error("Unknown {kind}: {id}")]
    NotFound { kind: String, id: String },

    /// Insufficient privilege for a requested command
    #[error("Permission denied: {action}")]
    PermissionDenied { action: String },

    /// Every item of a batch action failed
    #[error("Action failed for every selected module:\n{reasons}")]
    AllFailed { reasons: String },

    /// Module root directory is not writable
    #[error("Modules root is not writable: {path}")]
    SourceNotWritable { path: String },

    /// Module root lies outside the managed, deletable root
    #[error("Refusing to delete outside the managed root: {path}")]
    UndeletableRoot { path: String },

    /// Remote feed fetch or parse failure
    #[error("Repository feed error: {message}")]
    Feed { message: String },

    /// Package download/verify/extract failure
    #[error("Package error: {message}")]
    Package { message: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid filter id error
    pub fn invalid_filter_id(id: impl Into<String>) -> Self {
        Self::InvalidFilterId { id: id.into() }
    }

    /// Create a not-found error
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(action: impl Into<String>) -> Self {
        Self::PermissionDenied {
            action: action.into(),
        }
    }

    /// Create an all-failed error from per-item reasons
    pub fn all_failed(reasons: &[(String, String)]) -> Self {
        Self::AllFailed {
            reasons: reasons
                .iter()
                .map(|(id, why)| format!("{id}: {why}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Create a source-not-writable error
    pub fn source_not_writable(path: impl Into<String>) -> Self {
        Self::SourceNotWritable { path: path.into() }
    }

    /// Create an undeletable-root error
    pub fn undeletable_root(path: impl Into<String>) -> Self {
        Self::UndeletableRoot { path: path.into() }
    }

    /// Create a feed error
    pub fn feed(message: impl Into<String>) -> Self {
        Self::Feed {
            message: message.into(),
        }
    }

    /// Create a package error
    pub fn package(message: impl Into<String>) -> Self {
        Self::Package {
            message: message.into(),
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
