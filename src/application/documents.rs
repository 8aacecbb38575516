//! Document use cases: create, load, save, import, merge.
//!
//! These are the entry points a front end (editor, CLI) calls; everything
//! format-specific is resolved here once via [`FileFormat`].

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::format::FileFormat;
use crate::domain::{merge_trees, Document, NodeId};
use crate::infrastructure::{cherrytree, lts, notecase};

/// Fresh document with a single empty "Root" node.
pub fn new_document() -> Document {
    Document::default()
}

/// Loads a document in any supported format, chosen by extension.
#[instrument(level = "debug")]
pub fn load(path: &Path) -> ApplicationResult<Document> {
    let format = FileFormat::from_path(path)?;
    info!("loading {} document {}", format, path.display());
    let document = match format {
        FileFormat::Lts => lts::load(path)?,
        FileFormat::CherryTree => cherrytree::import(path)?,
        FileFormat::NoteCase => notecase::import(path)?,
    };
    Ok(document)
}

/// Saves in LTS format and returns the path written (`.lts` is appended
/// when missing).
#[instrument(level = "debug", skip(document))]
pub fn save(document: &Document, path: &Path) -> ApplicationResult<PathBuf> {
    let written = lts::save(document, path)?;
    info!("saved {} nodes to {}", document.node_count(), written.display());
    Ok(written)
}

/// Imports a foreign outline; native `.lts` files are rejected.
pub fn import_foreign(path: &Path) -> ApplicationResult<Document> {
    if !FileFormat::from_path(path)?.is_foreign() {
        return Err(ApplicationError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }
    load(path)
}

/// Loads `path` (any format) and appends its top-level nodes to `base`.
#[instrument(level = "debug", skip(base))]
pub fn merge_file(base: &mut Document, path: &Path) -> ApplicationResult<Vec<NodeId>> {
    let incoming = load(path)?;
    Ok(merge_trees(base, &incoming)?)
}
