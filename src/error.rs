use thiserror::Error;

use crate::domain::Version;

/// Unified error type for semrel operations
#[derive(Error, Debug)]
pub enum SemrelError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error(
        "Version regression: candidate {candidate} does not exceed released version {highest}"
    )]
    VersionRegression { candidate: Version, highest: Version },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in semrel
pub type Result<T> = std::result::Result<T, SemrelError>;

impl SemrelError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        SemrelError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        SemrelError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        SemrelError::Tag(msg.into())
    }

    /// Whether the error must stop the run outright.
    ///
    /// Broken configuration and a regressing version are never retried or
    /// worked around; everything else is an environmental failure the caller
    /// may choose to report differently.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SemrelError::Config(_) | SemrelError::VersionRegression { .. }
        )
    }
}
