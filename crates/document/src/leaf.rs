use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a text leaf.
///
/// Ids are ordered by document position: for two leaves `a` and `b`, `a.id < b.id`
/// iff `a` precedes `b` in document order. Every [`TreeCursor`](crate::TreeCursor)
/// adapter must hand out ids that respect this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LeafId(pub u64);

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leaf#{}", self.0)
    }
}

/// One atomic text-bearing unit in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLeaf {
    pub id: LeafId,
    pub text: String,
}

impl TextLeaf {
    pub fn new(id: LeafId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Length in chars; selection offsets are char offsets
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    #[must_use]
    pub fn word_count(&self) -> usize {
        crate::words::count_words(&self.text)
    }

    /// True when the leaf carries no visible text
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
