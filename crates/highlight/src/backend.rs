use crate::error::Result;
use serde::{Deserialize, Serialize};
use sidechat_document::SelectionRange;
use std::collections::{HashMap, HashSet};

/// Visual role of a highlight bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightRole {
    Selected,
    NonSelected,
    Context,
}

impl HighlightRole {
    pub const ALL: [Self; 3] = [Self::Selected, Self::NonSelected, Self::Context];

    /// Style name a host registers for this role
    #[must_use]
    pub const fn style_name(self) -> &'static str {
        match self {
            Self::Selected => "sidechat-selected",
            Self::NonSelected => "sidechat-non-selected",
            Self::Context => "sidechat-context",
        }
    }
}

/// Host mechanism that paints ranges with a per-role style
pub trait HighlightBackend {
    /// Register the style for `role`; fails when the host cannot highlight at all
    fn register(&mut self, role: HighlightRole) -> Result<()>;

    /// Replace every range currently painted for `role`
    fn sync(&mut self, role: HighlightRole, ranges: &[SelectionRange]);
}

impl<B: HighlightBackend + ?Sized> HighlightBackend for Box<B> {
    fn register(&mut self, role: HighlightRole) -> Result<()> {
        (**self).register(role)
    }

    fn sync(&mut self, role: HighlightRole, ranges: &[SelectionRange]) {
        (**self).sync(role, ranges);
    }
}

/// Keeps the last synced ranges per role in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingBackend {
    registered: HashSet<HighlightRole>,
    painted: HashMap<HighlightRole, Vec<SelectionRange>>,
    syncs: usize,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_registered(&self, role: HighlightRole) -> bool {
        self.registered.contains(&role)
    }

    #[must_use]
    pub fn painted(&self, role: HighlightRole) -> &[SelectionRange] {
        self.painted.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of sync calls received
    #[must_use]
    pub const fn sync_count(&self) -> usize {
        self.syncs
    }
}

impl HighlightBackend for RecordingBackend {
    fn register(&mut self, role: HighlightRole) -> Result<()> {
        self.registered.insert(role);
        Ok(())
    }

    fn sync(&mut self, role: HighlightRole, ranges: &[SelectionRange]) {
        self.syncs += 1;
        self.painted.insert(role, ranges.to_vec());
    }
}

/// Accepts everything and paints nothing.
///
/// For hosts that caught a missing capability and chose to run without visual
/// highlights.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl HighlightBackend for NullBackend {
    fn register(&mut self, _role: HighlightRole) -> Result<()> {
        Ok(())
    }

    fn sync(&mut self, _role: HighlightRole, _ranges: &[SelectionRange]) {}
}
