use crate::instance::WidgetId;
use sidechat_context_window::ContextWindowError;
use sidechat_highlight::HighlightError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Highlight error: {0}")]
    Highlight(#[from] HighlightError),

    #[error("Context window error: {0}")]
    ContextWindow(#[from] ContextWindowError),

    #[error("Unknown widget: {0}")]
    UnknownWidget(WidgetId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl SessionError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True when the host has no highlighting mechanism at all
    pub fn is_capability_missing(&self) -> bool {
        matches!(
            self,
            Self::Highlight(HighlightError::CapabilityMissing(_))
        )
    }
}
