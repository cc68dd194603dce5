use thiserror::Error;

/// Result type for context window operations
pub type Result<T> = std::result::Result<T, ContextWindowError>;

/// Errors raised while setting up extraction.
///
/// Extraction itself never fails: an unusable selection yields an empty window.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContextWindowError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ContextWindowError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
