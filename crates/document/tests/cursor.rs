use pretty_assertions::assert_eq;
use sidechat_document::{
    DocumentBuilder, DocumentError, DocumentTree, LeafId, SelectionRange, TextPosition, TreeCursor,
};

fn texts(leaves: &[sidechat_document::TextLeaf]) -> Vec<&str> {
    leaves.iter().map(|l| l.text.as_str()).collect()
}

fn sample() -> DocumentTree {
    DocumentTree::from_outline(
        "# One\nfirst line\nsecond line\n\nthird line\n\n## Nested\ninner line\n\n# Two\nlast line\n",
    )
}

#[test]
fn outline_nests_sections_by_heading_level() {
    let tree = sample();
    let root = tree.root();
    let sections = tree.children(root);
    assert_eq!(sections.len(), 2);
    assert!(sections.iter().all(|s| tree.tag(*s) == Some("section")));

    // heading, two paragraphs, nested section
    let first = tree.children(sections[0]);
    let tags: Vec<_> = first.iter().map(|n| tree.tag(*n)).collect();
    assert_eq!(
        tags,
        vec![
            Some("heading"),
            Some("paragraph"),
            Some("paragraph"),
            Some("section")
        ]
    );
}

#[test]
fn leaves_come_back_in_document_order() {
    let tree = sample();
    assert_eq!(
        texts(&tree.leaves(&tree.root())),
        vec![
            "One",
            "first line",
            "second line",
            "third line",
            "Nested",
            "inner line",
            "Two",
            "last line"
        ]
    );
    let ids: Vec<LeafId> = tree.all_leaves().iter().map(|l| l.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn siblings_are_split_around_the_node() {
    let tree = sample();
    let paragraph = tree.children(tree.children(tree.root())[0])[1];
    let leaf_nodes = tree.children(paragraph).to_vec();
    assert_eq!(leaf_nodes.len(), 2);

    assert_eq!(tree.previous_siblings(&leaf_nodes[1]), vec![leaf_nodes[0]]);
    assert!(tree.next_siblings(&leaf_nodes[1]).is_empty());
    assert!(tree.previous_siblings(&tree.root()).is_empty());
    assert_eq!(tree.parent(&leaf_nodes[0]), Some(paragraph));
    assert_eq!(tree.parent(&tree.root()), None);
}

#[test]
fn node_for_selection_is_the_common_ancestor() {
    let tree = sample();
    let within = tree.find("second").unwrap();
    let node = tree.node_for_selection(&within).unwrap();
    assert_eq!(tree.tag(node), None);

    let across = tree.find("line third").unwrap();
    let ancestor = tree.node_for_selection(&across).unwrap();
    assert_eq!(tree.tag(ancestor), Some("section"));
}

#[test]
fn find_spans_leaf_boundaries() {
    let tree = sample();
    let leaves = tree.all_leaves();
    let range = tree.find("line second").unwrap();
    assert_eq!(range.start(), TextPosition::new(leaves[1].id, 6));
    assert_eq!(range.end(), TextPosition::new(leaves[2].id, 6));

    let owned: Vec<_> = leaves.into_iter().cloned().collect();
    assert_eq!(range.text_in(&owned), "line second");
    assert!(tree.find("absent").is_none());
    assert!(tree.find("").is_none());
}

#[test]
fn opaque_and_nested_opaque_text_is_skipped() {
    let mut builder = DocumentBuilder::new("page");
    builder.text("visible");
    builder.open_opaque("textarea");
    builder.text("typed");
    builder.open("span");
    builder.text("deeper");
    builder.close().unwrap();
    builder.close().unwrap();
    let tree = builder.finish();

    assert_eq!(texts(&tree.leaves(&tree.root())), vec!["visible"]);
    assert_eq!(tree.all_leaves().len(), 3);
}

#[test]
fn builder_rejects_unbalanced_close() {
    let mut builder = DocumentBuilder::new("page");
    assert_eq!(builder.close(), Err(DocumentError::UnbalancedClose));
}

#[test]
fn selection_text_follows_the_selection() {
    let tree = sample();
    let across = tree.find("line second").unwrap();
    assert_eq!(tree.selection_text(&across), "line second");

    let within = tree.find("inner").unwrap();
    assert_eq!(tree.selection_text(&within), "inner");

    let unknown = SelectionRange::within_leaf(LeafId(500), 0, 1);
    assert_eq!(tree.selection_text(&unknown), "");
}

#[test]
fn selection_text_reads_opaque_regions() {
    let mut builder = DocumentBuilder::new("page");
    builder.text("visible");
    builder.open_opaque("textarea");
    let typed = builder.text("typed by hand");
    builder.close().unwrap();
    let tree = builder.finish();

    let selection = SelectionRange::within_leaf(typed, 0, 5);
    assert_eq!(tree.selection_text(&selection), "typed");
    assert!(tree.leaves(&tree.root()).iter().all(|l| l.id != typed));
}
