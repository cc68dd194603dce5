use crate::leaf::TextLeaf;
use crate::selection::SelectionRange;
use std::fmt::Debug;

/// Read-only navigation over a host document.
///
/// Implementations never mutate the document. A subtree without text-bearing leaves
/// yields an empty sequence; no method fails on a well-formed tree.
pub trait TreeCursor {
    /// Opaque node handle (element or text node)
    type Node: Clone + PartialEq + Debug;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Siblings before `node`, in document order (first sibling first)
    fn previous_siblings(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Siblings after `node`, in document order
    fn next_siblings(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// All text leaves under `root` (inclusive), in document order
    fn leaves(&self, root: &Self::Node) -> Vec<TextLeaf>;

    /// Deepest node containing both ends of the selection
    fn node_for_selection(&self, selection: &SelectionRange) -> Option<Self::Node>;

    fn intersects(&self, leaf: &TextLeaf, selection: &SelectionRange) -> bool {
        selection.intersects(leaf)
    }

    /// Text covered by `selection`, pieces from different leaves joined by one space.
    /// Empty when no visible leaf holds the selection.
    fn selection_text(&self, selection: &SelectionRange) -> String {
        self.node_for_selection(selection)
            .map(|node| selection.text_in(&self.leaves(&node)))
            .unwrap_or_default()
    }
}
