//! Additive merge of documents.

use litestone::domain::{merge_into, merge_trees, Document, NodeRecord};

fn node(name: &str, children: Vec<NodeRecord>) -> NodeRecord {
    NodeRecord::new(name, format!("{name} body")).with_children(children)
}

fn doc(root: &str, top_level: Vec<NodeRecord>) -> Document {
    Document::from_record(&node(root, top_level))
}

fn top_level_names(doc: &Document) -> Vec<String> {
    doc.root_node()
        .children()
        .iter()
        .map(|&c| doc.node(c).unwrap().name.clone())
        .collect()
}

#[test]
fn given_two_documents_when_merging_then_incoming_top_level_appended_in_order() {
    let mut base = doc("base", vec![node("A", vec![]), node("B", vec![node("B1", vec![])])]);
    let incoming = doc(
        "other",
        vec![
            node("X", vec![node("X1", vec![]), node("X2", vec![])]),
            node("Y", vec![]),
        ],
    );

    let added = merge_trees(&mut base, &incoming).unwrap();

    assert_eq!(added.len(), 2);
    assert_eq!(top_level_names(&base), vec!["A", "B", "X", "Y"]);
    assert_eq!(base.root_node().name, "base");
    assert!(incoming.subtree_eq(incoming.resolve(&[0]).unwrap(), &base, added[0]));
    assert_eq!(base.node_count(), 8);
}

#[test]
fn given_same_names_when_merging_then_nodes_are_not_deduplicated() {
    let mut base = doc("base", vec![node("A", vec![])]);
    let incoming = doc("other", vec![node("A", vec![])]);

    merge_trees(&mut base, &incoming).unwrap();

    assert_eq!(top_level_names(&base), vec!["A", "A"]);
}

#[test]
fn given_merge_when_editing_base_afterwards_then_incoming_unchanged() {
    let mut base = doc("base", vec![]);
    let incoming = doc("other", vec![node("X", vec![node("X1", vec![])])]);
    let snapshot = incoming.clone();

    let added = merge_trees(&mut base, &incoming).unwrap();
    base.rename(added[0], "renamed").unwrap();
    base.delete_node(base.resolve(&[0, 0]).unwrap()).unwrap();

    assert_eq!(incoming, snapshot);
}

#[test]
fn given_empty_incoming_when_merging_then_base_unchanged() {
    let mut base = doc("base", vec![node("A", vec![node("A1", vec![])])]);
    let before = base.clone();

    let added = merge_trees(&mut base, &Document::new("empty")).unwrap();

    assert!(added.is_empty());
    assert_eq!(base, before);
}

#[test]
fn given_document_when_merging_its_own_clone_then_content_doubles() {
    let mut base = doc("base", vec![node("A", vec![node("A1", vec![])]), node("B", vec![])]);
    let copy = base.clone();

    merge_trees(&mut base, &copy).unwrap();

    assert_eq!(top_level_names(&base), vec!["A", "B", "A", "B"]);
    assert_eq!(base.node_count(), 7);
}

#[test]
fn given_target_node_when_merging_into_then_children_land_there() {
    let mut base = doc("base", vec![node("Inbox", vec![]), node("Archive", vec![])]);
    let incoming = doc("other", vec![node("X", vec![]), node("Y", vec![])]);
    let inbox = base.resolve(&[0]).unwrap();

    merge_into(&mut base, inbox, &incoming, incoming.root()).unwrap();

    assert_eq!(top_level_names(&base), vec!["Inbox", "Archive"]);
    assert_eq!(base.path_of(base.resolve(&[0, 1]).unwrap()), Some(vec![0, 1]));
    assert_eq!(base.node(base.resolve(&[0, 1]).unwrap()).unwrap().name, "Y");
}
