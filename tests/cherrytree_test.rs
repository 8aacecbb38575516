//! CherryTree XML import.

use std::fs;

use rstest::rstest;
use tempfile::TempDir;

use litestone::domain::{Document, NodeRecord};
use litestone::infrastructure::cherrytree::{self, IMPORT_ROOT_NAME};
use litestone::infrastructure::{InfraError, UNTITLED};

const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<cherrytree>
  <node name="Projects" unique_id="1" prog_lang="custom-colors">
    <rich_text>Active &amp; planned</rich_text>
    <node name="Rust" unique_id="2" rich_text="ownership &lt;3"/>
    <node unique_id="3">
      <rich_text><![CDATA[<b>raw</b>]]></rich_text>
    </node>
  </node>
  <node name="Inbox" unique_id="4"/>
</cherrytree>
"#;

fn write_ctd(dir: &TempDir, name: &str, xml: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, xml).unwrap();
    path
}

#[test]
fn given_nested_nodes_when_importing_then_tree_shape_and_text_preserved() {
    let dir = TempDir::new().unwrap();
    let path = write_ctd(&dir, "notes.ctd", SAMPLE);

    let doc = cherrytree::import(&path).unwrap();

    let expected = NodeRecord::new(IMPORT_ROOT_NAME, "").with_children(vec![
        NodeRecord::new("Projects", "Active & planned").with_children(vec![
            NodeRecord::new("Rust", "ownership <3"),
            NodeRecord::new(UNTITLED, "<b>raw</b>"),
        ]),
        NodeRecord::new("Inbox", ""),
    ]);
    assert_eq!(doc, Document::from_record(&expected));
}

#[test]
fn given_node_without_name_when_parsing_then_untitled() {
    let doc = cherrytree::parse(r#"<cherrytree><node/></cherrytree>"#).unwrap();

    let only = doc.node(doc.root_node().children()[0]).unwrap();
    assert_eq!(only.name, UNTITLED);
    assert_eq!(only.content, "");
}

#[test]
fn given_empty_rich_text_attribute_when_parsing_then_child_element_used() {
    let doc = cherrytree::parse(
        r#"<cherrytree><node name="a" rich_text=""><rich_text>body</rich_text></node></cherrytree>"#,
    )
    .unwrap();

    assert_eq!(doc.node(doc.root_node().children()[0]).unwrap().content, "body");
}

#[test]
fn given_document_element_without_nodes_when_parsing_then_only_import_root() {
    let doc = cherrytree::parse("<cherrytree/>").unwrap();

    assert_eq!(doc.node_count(), 1);
    assert_eq!(doc.root_node().name, IMPORT_ROOT_NAME);
}

#[test]
fn given_deeply_nested_nodes_when_parsing_then_depth_preserved() {
    let levels = 2_000;
    let xml = format!(
        "<cherrytree>{}{}</cherrytree>",
        "<node name=\"n\">".repeat(levels),
        "</node>".repeat(levels)
    );

    let doc = cherrytree::parse(&xml).unwrap();

    assert_eq!(doc.depth(), levels + 1);
}

// ============================================================
// Errors
// ============================================================

#[test]
fn given_mismatched_tags_when_importing_then_xml_error() {
    let dir = TempDir::new().unwrap();
    let path = write_ctd(&dir, "bad.ctd", "<cherrytree><node name=\"a\"></cherrytree>");

    let err = cherrytree::import(&path).unwrap_err();

    assert!(matches!(err, InfraError::Xml { .. }), "{err}");
    assert!(err.is_format());
}

#[rstest]
#[case::element_after_document(r#"<cherrytree><node name="a"/></cherrytree><junk/>"#)]
#[case::text_after_document(r#"<cherrytree><node name="a"/></cherrytree>trailing text"#)]
#[case::text_before_document(r#"stray<cherrytree/>"#)]
#[case::undefined_entity_in_attribute(r#"<cherrytree><node name="a" x="&bogus;"/></cherrytree>"#)]
#[case::duplicate_attribute(r#"<cherrytree><node name="a" name="b"/></cherrytree>"#)]
#[case::raw_lt_in_ignored_element(r#"<cherrytree><other a="<"/></cherrytree>"#)]
#[case::undefined_entity_in_ignored_text(r#"<cherrytree><other>&bogus;</other></cherrytree>"#)]
fn given_malformed_xml_when_parsing_then_rejected(#[case] xml: &str) {
    let err = cherrytree::parse(xml).unwrap_err();
    assert!(!err.message.is_empty());
}

#[test]
fn given_whitespace_and_comments_around_document_when_parsing_then_accepted() {
    let xml = "<?xml version=\"1.0\"?>\n<!-- saved -->\n<cherrytree><node name=\"a\"/></cherrytree>\n<!-- end -->\n";

    let doc = cherrytree::parse(xml).unwrap();

    assert_eq!(doc.node_count(), 2);
}

#[test]
fn given_trailing_element_when_importing_then_xml_error() {
    let dir = TempDir::new().unwrap();
    let path = write_ctd(&dir, "extra.ctd", "<cherrytree></cherrytree><cherrytree/>");

    assert!(cherrytree::import(&path).unwrap_err().is_format());
}

#[test]
fn given_non_utf8_file_when_importing_then_xml_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.ctd");
    fs::write(&path, b"<cherrytree><node name=\"caf\xe9\"/></cherrytree>").unwrap();

    assert!(matches!(
        cherrytree::import(&path),
        Err(InfraError::Xml { .. })
    ));
}

#[test]
fn given_missing_file_when_importing_then_not_found() {
    let dir = TempDir::new().unwrap();

    let err = cherrytree::import(&dir.path().join("absent.ctd")).unwrap_err();

    assert!(err.is_not_found());
}
