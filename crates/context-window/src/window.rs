use serde::{Deserialize, Serialize};
use sidechat_document::{join_leaves, LeafId, TextLeaf};

/// Leaves chosen as surrounding context for one selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    /// Chosen leaves, in document order
    pub leaves: Vec<TextLeaf>,

    /// Leaves joined with single spaces, each trimmed
    pub text: String,

    pub word_count: usize,

    /// Symmetric expansion radius around the pivot, in leaf indices
    pub radius: usize,

    /// Center leaf of the search
    pub pivot: Option<LeafId>,

    /// Ancestor levels climbed during widening
    pub levels_climbed: usize,

    /// Set when even the pivot alone exceeded the budget
    pub over_budget: bool,
}

impl ContextWindow {
    /// No usable context (selection intersects no traversable leaf)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_leaves(
        leaves: Vec<TextLeaf>,
        word_count: usize,
        radius: usize,
        pivot: LeafId,
    ) -> Self {
        let text = join_leaves(&leaves);
        Self {
            leaves,
            text,
            word_count,
            radius,
            pivot: Some(pivot),
            levels_climbed: 0,
            over_budget: false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn leaf_ids(&self) -> impl Iterator<Item = LeafId> + '_ {
        self.leaves.iter().map(|leaf| leaf.id)
    }
}
