//! Format dispatch and document use cases.

use std::fs;

use tempfile::TempDir;

use litestone::application::{self, ApplicationError};
use litestone::domain::{Document, DEFAULT_ROOT_NAME};
use litestone::infrastructure::{cherrytree, InfraError};
use litestone::util::testing;

const CTD: &str = r#"<cherrytree><node name="A"><node name="A1"/></node><node name="B"/></cherrytree>"#;

#[test]
fn given_new_document_when_inspecting_then_single_empty_root() {
    let doc = application::new_document();

    assert_eq!(doc.node_count(), 1);
    assert_eq!(doc.root_node().name, DEFAULT_ROOT_NAME);
    assert!(doc.root_node().content.is_empty());
}

#[test]
fn given_each_format_when_loading_then_dispatched_by_extension() {
    testing::init_test_setup();
    let dir = TempDir::new().unwrap();

    let ctd = dir.path().join("outline.CTD");
    fs::write(&ctd, CTD).unwrap();
    let imported = application::load(&ctd).unwrap();
    assert_eq!(imported.root_node().name, cherrytree::IMPORT_ROOT_NAME);
    assert_eq!(imported.node_count(), 4);

    let lts = application::save(&imported, &dir.path().join("outline")).unwrap();
    assert_eq!(lts, dir.path().join("outline.lts"));
    assert_eq!(application::load(&lts).unwrap(), imported);
}

#[test]
fn given_unknown_extension_when_loading_then_unsupported_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "plain").unwrap();

    let err = application::load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::UnsupportedFormat { .. }), "{err}");
}

#[test]
fn given_lts_file_when_importing_foreign_then_rejected() {
    let dir = TempDir::new().unwrap();
    let path = application::save(&Document::default(), &dir.path().join("a.lts")).unwrap();

    assert!(matches!(
        application::import_foreign(&path),
        Err(ApplicationError::UnsupportedFormat { .. })
    ));
}

#[test]
fn given_missing_notecase_file_when_importing_then_invalid_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gone.ncd");

    let err = application::import_foreign(&path).unwrap_err();

    assert!(
        matches!(err, ApplicationError::Infra(InfraError::InvalidStore { .. })),
        "{err}"
    );
    assert!(err.is_format());
    assert!(!path.exists());
}

#[test]
fn given_malformed_cherrytree_when_loading_then_format_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.ctd");
    fs::write(&path, "<cherrytree><node>").unwrap();

    assert!(application::load(&path).unwrap_err().is_format());
}

#[test]
fn given_foreign_file_when_merging_then_its_top_level_nodes_appended() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("extra.ctd");
    fs::write(&path, CTD).unwrap();
    let mut base = application::new_document();

    let added = application::merge_file(&mut base, &path).unwrap();

    assert_eq!(added.len(), 2);
    assert_eq!(base.root_node().name, DEFAULT_ROOT_NAME);
    assert_eq!(base.node_count(), 4);
    assert_eq!(base.node(added[1]).unwrap().name, "B");
}

#[test]
fn given_failed_merge_when_source_missing_then_base_untouched() {
    let dir = TempDir::new().unwrap();
    let mut base = application::new_document();
    let before = base.clone();

    let result = application::merge_file(&mut base, &dir.path().join("gone.ncd"));

    assert!(result.is_err());
    assert_eq!(base, before);
}
