use crate::cursor::TreeCursor;
use crate::error::{DocumentError, Result};
use crate::leaf::{LeafId, TextLeaf};
use crate::selection::{SelectionRange, TextPosition};
use std::collections::HashMap;

/// Index of a node inside a [`DocumentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element { tag: String, opaque: bool },
    Text(TextLeaf),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Inside an opaque element (input-like region); its text is not traversable
    hidden: bool,
}

/// In-memory document snapshot implementing [`TreeCursor`]
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<Node>,
    leaf_nodes: HashMap<LeafId, NodeId>,
}

impl DocumentTree {
    /// Build a tree from markdown-like outline text.
    ///
    /// `#` headings open sections (nested by level), blank lines end paragraphs and every
    /// other non-empty line becomes one text leaf inside the current paragraph.
    #[must_use]
    pub fn from_outline(source: &str) -> Self {
        let mut builder = DocumentBuilder::new("document");
        // Open section levels, innermost last
        let mut sections: Vec<usize> = Vec::new();
        let mut in_paragraph = false;

        for raw in source.lines() {
            let line = raw.trim();
            if line.is_empty() {
                if in_paragraph {
                    builder.close_unchecked();
                    in_paragraph = false;
                }
                continue;
            }

            let level = line.chars().take_while(|c| *c == '#').count();
            if level > 0 && line[level..].starts_with(' ') {
                if in_paragraph {
                    builder.close_unchecked();
                    in_paragraph = false;
                }
                while sections.last().is_some_and(|open| *open >= level) {
                    builder.close_unchecked();
                    sections.pop();
                }
                builder.open("section");
                sections.push(level);
                builder.open("heading");
                builder.text(line[level..].trim());
                builder.close_unchecked();
                continue;
            }

            if !in_paragraph {
                builder.open("paragraph");
                in_paragraph = true;
            }
            builder.text(line);
        }

        builder.finish()
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn leaf(&self, id: LeafId) -> Result<&TextLeaf> {
        let node = self
            .leaf_nodes
            .get(&id)
            .ok_or(DocumentError::UnknownLeaf(id))?;
        match &self.nodes[node.0].kind {
            NodeKind::Text(leaf) => Ok(leaf),
            NodeKind::Element { .. } => Err(DocumentError::UnknownLeaf(id)),
        }
    }

    #[must_use]
    pub fn leaf_node(&self, id: LeafId) -> Option<NodeId> {
        self.leaf_nodes.get(&id).copied()
    }

    /// Every text leaf in document order, including ones inside opaque regions
    #[must_use]
    pub fn all_leaves(&self) -> Vec<&TextLeaf> {
        let mut ids: Vec<&LeafId> = self.leaf_nodes.keys().collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|id| self.leaf(*id).ok())
            .collect()
    }

    /// First occurrence of `needle` in document order. Leaves are joined by one space,
    /// so a match may span leaf boundaries.
    #[must_use]
    pub fn find(&self, needle: &str) -> Option<SelectionRange> {
        if needle.is_empty() {
            return None;
        }
        let leaves = self.all_leaves();

        // (leaf, byte offset of its text inside `joined`)
        let mut segments = Vec::with_capacity(leaves.len());
        let mut joined = String::new();
        for (idx, leaf) in leaves.iter().enumerate() {
            if idx > 0 {
                joined.push(' ');
            }
            segments.push((*leaf, joined.len()));
            joined.push_str(&leaf.text);
        }

        let byte = joined.find(needle)?;
        let start = Self::position_at(&segments, byte, false)?;
        let end = Self::position_at(&segments, byte + needle.len(), true)?;
        Some(SelectionRange::new(start, end))
    }

    fn position_at(
        segments: &[(&TextLeaf, usize)],
        byte: usize,
        is_end: bool,
    ) -> Option<TextPosition> {
        for (idx, (leaf, seg_start)) in segments.iter().enumerate() {
            let seg_end = seg_start + leaf.text.len();
            let inside = if is_end {
                byte >= *seg_start && byte <= seg_end
            } else {
                byte >= *seg_start && byte < seg_end
            };
            if inside {
                let offset = leaf.text[..byte - seg_start].chars().count();
                return Some(TextPosition::new(leaf.id, offset));
            }
            // A match starting on the joining space begins at the next leaf
            if !is_end && byte == seg_end {
                return segments
                    .get(idx + 1)
                    .map(|(next, _)| TextPosition::new(next.id, 0));
            }
        }
        None
    }

    fn ancestors_inclusive(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = vec![node];
        let mut current = node;
        while let Some(parent) = self.nodes[current.0].parent {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    fn collect_leaves(&self, node: NodeId, out: &mut Vec<TextLeaf>) {
        let entry = &self.nodes[node.0];
        if entry.hidden {
            return;
        }
        match &entry.kind {
            NodeKind::Text(leaf) => out.push(leaf.clone()),
            NodeKind::Element { opaque: true, .. } => {}
            NodeKind::Element { .. } => {
                for child in &entry.children {
                    self.collect_leaves(*child, out);
                }
            }
        }
    }

    fn siblings(&self, node: NodeId) -> (&[NodeId], usize) {
        let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            return (&[], 0);
        };
        let children = self.nodes[parent.0].children.as_slice();
        let idx = children.iter().position(|c| *c == node).unwrap_or(0);
        (children, idx)
    }
}

impl TreeCursor for DocumentTree {
    type Node = NodeId;

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn previous_siblings(&self, node: &NodeId) -> Vec<NodeId> {
        let (children, idx) = self.siblings(*node);
        children[..idx.min(children.len())].to_vec()
    }

    fn next_siblings(&self, node: &NodeId) -> Vec<NodeId> {
        let (children, idx) = self.siblings(*node);
        children.get(idx + 1..).map(<[NodeId]>::to_vec).unwrap_or_default()
    }

    fn leaves(&self, root: &NodeId) -> Vec<TextLeaf> {
        let mut out = Vec::new();
        if root.0 < self.nodes.len() {
            self.collect_leaves(*root, &mut out);
        }
        out
    }

    fn node_for_selection(&self, selection: &SelectionRange) -> Option<NodeId> {
        let start = self.leaf_node(selection.start().leaf)?;
        let end = self.leaf_node(selection.end().leaf)?;
        if start == end {
            return Some(start);
        }
        let end_chain = self.ancestors_inclusive(end);
        self.ancestors_inclusive(start)
            .into_iter()
            .find(|candidate| end_chain.contains(candidate))
    }

    /// Opaque regions are skipped for context, but text the user highlighted inside one
    /// is still theirs
    fn selection_text(&self, selection: &SelectionRange) -> String {
        let leaves: Vec<TextLeaf> = self.all_leaves().into_iter().cloned().collect();
        selection.text_in(&leaves)
    }
}

/// Stack-based builder. Leaves receive ids in creation order, which is document order.
#[derive(Debug)]
pub struct DocumentBuilder {
    nodes: Vec<Node>,
    leaf_nodes: HashMap<LeafId, NodeId>,
    open: Vec<NodeId>,
    next_leaf: u64,
}

impl DocumentBuilder {
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element {
                    tag: root_tag.into(),
                    opaque: false,
                },
                parent: None,
                children: Vec::new(),
                hidden: false,
            }],
            leaf_nodes: HashMap::new(),
            open: vec![NodeId(0)],
            next_leaf: 0,
        }
    }

    /// Open a child element of the current element
    pub fn open(&mut self, tag: impl Into<String>) -> NodeId {
        self.push_element(tag.into(), false)
    }

    /// Open an element whose text is not traversable (e.g. a text input)
    pub fn open_opaque(&mut self, tag: impl Into<String>) -> NodeId {
        self.push_element(tag.into(), true)
    }

    pub fn close(&mut self) -> Result<()> {
        if self.open.len() <= 1 {
            return Err(DocumentError::UnbalancedClose);
        }
        self.open.pop();
        Ok(())
    }

    fn close_unchecked(&mut self) {
        if self.open.len() > 1 {
            self.open.pop();
        }
    }

    /// Append a text leaf to the current element
    pub fn text(&mut self, text: impl Into<String>) -> LeafId {
        let id = LeafId(self.next_leaf);
        self.next_leaf += 1;
        let node = self.push_node(NodeKind::Text(TextLeaf::new(id, text)));
        self.leaf_nodes.insert(id, node);
        id
    }

    /// Finish building; open elements are closed implicitly
    #[must_use]
    pub fn finish(self) -> DocumentTree {
        log::debug!(
            "Document built: {} nodes, {} leaves",
            self.nodes.len(),
            self.leaf_nodes.len()
        );
        DocumentTree {
            nodes: self.nodes,
            leaf_nodes: self.leaf_nodes,
        }
    }

    fn push_element(&mut self, tag: String, opaque: bool) -> NodeId {
        let id = self.push_node(NodeKind::Element { tag, opaque });
        self.open.push(id);
        id
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let parent = *self.open.last().unwrap_or(&NodeId(0));
        let parent_entry = &self.nodes[parent.0];
        let hidden = parent_entry.hidden
            || matches!(parent_entry.kind, NodeKind::Element { opaque: true, .. });
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            hidden,
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(leaves: &[TextLeaf]) -> Vec<&str> {
        leaves.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn outline_nests_sections_and_paragraphs() {
        let tree = DocumentTree::from_outline(
            "# One\nfirst line\nsecond line\n\nnew paragraph\n## Sub\nsub text\n# Two\ntail\n",
        );
        let root = tree.root();
        let top: Vec<_> = tree
            .children(root)
            .iter()
            .filter_map(|n| tree.tag(*n))
            .collect();
        assert_eq!(top, vec!["section", "section"]);
        assert_eq!(
            texts(&tree.leaves(&root)),
            vec![
                "One",
                "first line",
                "second line",
                "new paragraph",
                "Sub",
                "sub text",
                "Two",
                "tail"
            ]
        );
    }

    #[test]
    fn hash_without_space_is_plain_text() {
        let tree = DocumentTree::from_outline("#hashtag line\n");
        let root = tree.root();
        assert_eq!(tree.tag(tree.children(root)[0]), Some("paragraph"));
    }

    #[test]
    fn siblings_are_in_document_order() {
        let mut b = DocumentBuilder::new("root");
        let first = b.text("a");
        b.text("b");
        b.text("c");
        b.text("d");
        let tree = b.finish();
        let node = tree.leaf_node(LeafId(2)).unwrap();
        let prev: Vec<_> = tree
            .previous_siblings(&node)
            .into_iter()
            .flat_map(|n| tree.leaves(&n))
            .collect();
        let next: Vec<_> = tree
            .next_siblings(&node)
            .into_iter()
            .flat_map(|n| tree.leaves(&n))
            .collect();
        assert_eq!(texts(&prev), vec!["a", "b"]);
        assert_eq!(texts(&next), vec!["d"]);
        assert_eq!(first, LeafId(0));
    }

    #[test]
    fn root_has_no_parent_or_siblings() {
        let tree = DocumentTree::from_outline("x\n");
        let root = tree.root();
        assert_eq!(tree.parent(&root), None);
        assert!(tree.previous_siblings(&root).is_empty());
        assert!(tree.next_siblings(&root).is_empty());
    }

    #[test]
    fn opaque_regions_hide_their_text() {
        let mut b = DocumentBuilder::new("root");
        b.text("visible");
        b.open_opaque("textarea");
        let hidden = b.text("typed by user");
        b.close().unwrap();
        let tree = b.finish();

        assert_eq!(texts(&tree.leaves(&tree.root())), vec!["visible"]);
        let node = tree.leaf_node(hidden).unwrap();
        assert!(tree.leaves(&node).is_empty());
    }

    #[test]
    fn close_on_root_is_rejected() {
        let mut b = DocumentBuilder::new("root");
        assert_eq!(b.close(), Err(DocumentError::UnbalancedClose));
    }

    #[test]
    fn node_for_selection_is_common_ancestor() {
        let tree = DocumentTree::from_outline("# A\none\ntwo\n\nthree\n");
        let single = tree.find("one").unwrap();
        assert_eq!(
            tree.node_for_selection(&single),
            tree.leaf_node(single.start().leaf)
        );

        let across = tree.find("two three").unwrap();
        let ancestor = tree.node_for_selection(&across).unwrap();
        assert_eq!(tree.tag(ancestor), Some("section"));
    }

    #[test]
    fn find_across_leaves_maps_offsets() {
        let tree = DocumentTree::from_outline("alpha beta\ngamma delta\n");
        let sel = tree.find("beta gamma").unwrap();
        assert_eq!(sel.start(), TextPosition::new(LeafId(0), 6));
        assert_eq!(sel.end(), TextPosition::new(LeafId(1), 5));
        assert_eq!(tree.find(""), None);
        assert_eq!(tree.find("missing"), None);
    }

    #[test]
    fn find_prefers_the_earliest_match_even_across_leaves() {
        let tree = DocumentTree::from_outline("alpha beta\ngamma\nbeta gamma\n");
        let sel = tree.find("beta gamma").unwrap();
        assert_eq!(sel.start(), TextPosition::new(LeafId(0), 6));
        assert_eq!(sel.end(), TextPosition::new(LeafId(1), 5));

        let single = tree.find("gamma").unwrap();
        assert_eq!(single, SelectionRange::within_leaf(LeafId(1), 0, 5));
    }
}
