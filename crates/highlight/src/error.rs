use crate::coordinator::HandleId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HighlightError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HighlightError {
    /// The host cannot associate a style with a set of ranges
    #[error("Highlighting capability missing: {0}")]
    CapabilityMissing(String),

    #[error("Unknown highlight handle: {0}")]
    UnknownHandle(HandleId),
}

impl HighlightError {
    pub fn capability_missing(msg: impl Into<String>) -> Self {
        Self::CapabilityMissing(msg.into())
    }
}
