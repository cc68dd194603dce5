use crate::conversation::Conversation;
use serde::{Deserialize, Serialize};
use sidechat_context_window::ContextWindow;
use sidechat_document::SelectionRange;
use sidechat_highlight::HandleId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WidgetId(pub u64);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}

/// Lifecycle state of a live panel. Closed panels leave the registry entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    /// Panel visible
    Expanded,
    /// Panel hidden, only the launcher icon shows
    Collapsed,
}

/// Layer-order attribute of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Base,
    Top,
}

impl Layer {
    /// Stacking value handed to the host's layout
    #[must_use]
    pub const fn z_index(self) -> u32 {
        match self {
            Self::Base => 1000,
            Self::Top => 1001,
        }
    }
}

/// One chat panel anchored to a selection
#[derive(Debug, Clone)]
pub struct WidgetInstance {
    pub id: WidgetId,
    pub selection: SelectionRange,
    pub selected_text: String,
    pub context: ContextWindow,
    pub handle: HandleId,
    pub state: WidgetState,
    pub layer: Layer,
    pub conversation: Conversation,
}

impl WidgetInstance {
    pub fn is_expanded(&self) -> bool {
        self.state == WidgetState::Expanded
    }

    pub fn is_in_flight(&self) -> bool {
        self.conversation.is_in_flight()
    }
}
