//! Error types for esview
//!
//! Re-exports the core error taxonomy and adds errors that only arise while
//! setting up a view.

use thiserror::Error;

// Re-export core error types
pub use esview_core::{EsError as CoreError, EsResult as CoreResult};

/// Errors that can occur while configuring or building a view
#[derive(Error, Debug)]
pub enum ViewError {
    /// Core scripting error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ViewError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Get the core error, if this wraps one
    pub fn core(&self) -> Option<&CoreError> {
        match self {
            Self::Core(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

impl From<toml::de::Error> for ViewError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<std::io::Error> for ViewError {
    fn from(e: std::io::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type alias for view setup
pub type ViewResult<T> = Result<T, ViewError>;
