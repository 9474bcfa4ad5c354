use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for jira-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Cannot read configuration '{}': {reason}", .path.display())]
    ConfigRead { path: PathBuf, reason: String },

    #[error("Missing configuration key '{key}' in section [{section}]")]
    MissingKey { section: String, key: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid JIRA credentials: {0}")]
    Authentication(String),

    #[error("Issue tracker error: {0}")]
    Tracker(String),

    #[error("{tag} already exists")]
    TagCollision { tag: String },

    #[error("Tag cannot be created: {0}")]
    Tag(String),

    #[error("Merge of '{reference}' has conflicts in: {}", .paths.join(", "))]
    MergeConflict {
        reference: String,
        paths: Vec<String>,
    },

    /// A VCS failure the pipeline may warn about and continue past.
    #[error("{0}")]
    RecoverableVcs(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in jira-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration read error for the given file
    pub fn config_read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ReleaseError::ConfigRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing key error
    pub fn missing_key(section: impl Into<String>, key: impl Into<String>) -> Self {
        ReleaseError::MissingKey {
            section: section.into(),
            key: key.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ReleaseError::InvalidInput(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        ReleaseError::Authentication(msg.into())
    }

    pub fn tracker(msg: impl Into<String>) -> Self {
        ReleaseError::Tracker(msg.into())
    }

    pub fn tag(msg: impl Into<String>) -> Self {
        ReleaseError::Tag(msg.into())
    }

    pub fn recoverable(msg: impl Into<String>) -> Self {
        ReleaseError::RecoverableVcs(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        ReleaseError::Remote(msg.into())
    }

    /// Whether the pipeline may log this error as a warning and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReleaseError::RecoverableVcs(_))
    }
}
