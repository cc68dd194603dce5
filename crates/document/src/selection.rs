use crate::leaf::{LeafId, TextLeaf};
use serde::{Deserialize, Serialize};

/// A caret position: a leaf plus a char offset into its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextPosition {
    pub leaf: LeafId,
    pub offset: usize,
}

impl TextPosition {
    #[must_use]
    pub const fn new(leaf: LeafId, offset: usize) -> Self {
        Self { leaf, offset }
    }
}

/// A user-chosen span of leaves, immutable once created.
///
/// `start <= end` always holds; [`SelectionRange::new`] normalizes reversed
/// (backwards-dragged) selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionRange {
    start: TextPosition,
    end: TextPosition,
}

impl SelectionRange {
    #[must_use]
    pub fn new(anchor: TextPosition, focus: TextPosition) -> Self {
        if anchor <= focus {
            Self {
                start: anchor,
                end: focus,
            }
        } else {
            Self {
                start: focus,
                end: anchor,
            }
        }
    }

    /// Selection inside a single leaf, `start..end` in chars
    #[must_use]
    pub fn within_leaf(leaf: LeafId, start: usize, end: usize) -> Self {
        Self::new(TextPosition::new(leaf, start), TextPosition::new(leaf, end))
    }

    #[must_use]
    pub const fn start(&self) -> TextPosition {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> TextPosition {
        self.end
    }

    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Whether `leaf` lies within the selected span of leaves
    #[must_use]
    pub fn intersects(&self, leaf: &TextLeaf) -> bool {
        leaf.id >= self.start.leaf && leaf.id <= self.end.leaf
    }

    /// Selected char span inside `leaf`, clamped to its length
    #[must_use]
    pub fn overlap(&self, leaf: &TextLeaf) -> Option<(usize, usize)> {
        if !self.intersects(leaf) {
            return None;
        }
        let len = leaf.char_len();
        let start = if leaf.id == self.start.leaf {
            self.start.offset.min(len)
        } else {
            0
        };
        let end = if leaf.id == self.end.leaf {
            self.end.offset.min(len)
        } else {
            len
        };
        Some((start, end.max(start)))
    }

    /// Selection covering all of `leaf`
    #[must_use]
    pub fn whole_leaf(leaf: &TextLeaf) -> Self {
        Self::within_leaf(leaf.id, 0, leaf.char_len())
    }

    /// Sub-ranges of `leaf` that fall outside this selection
    #[must_use]
    pub fn outside_parts(&self, leaf: &TextLeaf) -> Vec<SelectionRange> {
        let len = leaf.char_len();
        let Some((start, end)) = self.overlap(leaf) else {
            return vec![Self::whole_leaf(leaf)];
        };

        let mut parts = Vec::with_capacity(2);
        if start > 0 {
            parts.push(Self::within_leaf(leaf.id, 0, start));
        }
        if end < len {
            parts.push(Self::within_leaf(leaf.id, end, len));
        }
        parts
    }

    /// The selected text, given the leaves the selection spans
    #[must_use]
    pub fn text_in(&self, leaves: &[TextLeaf]) -> String {
        let mut pieces = Vec::new();
        for leaf in leaves {
            if let Some((start, end)) = self.overlap(leaf) {
                let piece: String = leaf.text.chars().skip(start).take(end - start).collect();
                pieces.push(piece);
            }
        }
        pieces.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(id: u64, text: &str) -> TextLeaf {
        TextLeaf::new(LeafId(id), text)
    }

    #[test]
    fn reversed_selection_is_normalized() {
        let sel = SelectionRange::new(
            TextPosition::new(LeafId(4), 2),
            TextPosition::new(LeafId(1), 0),
        );
        assert_eq!(sel.start().leaf, LeafId(1));
        assert_eq!(sel.end().leaf, LeafId(4));
    }

    #[test]
    fn intersects_spanned_leaves_only() {
        let sel = SelectionRange::new(
            TextPosition::new(LeafId(2), 1),
            TextPosition::new(LeafId(4), 1),
        );
        assert!(!sel.intersects(&leaf(1, "a")));
        assert!(sel.intersects(&leaf(2, "a")));
        assert!(sel.intersects(&leaf(3, "a")));
        assert!(sel.intersects(&leaf(4, "a")));
        assert!(!sel.intersects(&leaf(5, "a")));
    }

    #[test]
    fn outside_parts_split_straddling_leaf() {
        let text = leaf(3, "The quick brown fox");
        let sel = SelectionRange::within_leaf(LeafId(3), 4, 9);
        assert_eq!(
            sel.outside_parts(&text),
            vec![
                SelectionRange::within_leaf(LeafId(3), 0, 4),
                SelectionRange::within_leaf(LeafId(3), 9, 19)
            ]
        );
    }

    #[test]
    fn outside_parts_of_fully_selected_leaf_is_empty() {
        let sel = SelectionRange::new(
            TextPosition::new(LeafId(1), 0),
            TextPosition::new(LeafId(3), 0),
        );
        assert!(sel.outside_parts(&leaf(2, "middle")).is_empty());
        assert_eq!(
            sel.outside_parts(&leaf(5, "after")),
            vec![SelectionRange::within_leaf(LeafId(5), 0, 5)]
        );
    }

    #[test]
    fn text_in_collects_selected_chars() {
        let leaves = vec![leaf(1, "hello world"), leaf(2, "goodbye moon")];
        let sel = SelectionRange::new(
            TextPosition::new(LeafId(1), 6),
            TextPosition::new(LeafId(2), 7),
        );
        assert_eq!(sel.text_in(&leaves), "world goodbye");
    }
}
