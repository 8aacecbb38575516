//! NoteCase (`.ncd`) importer
//!
//! NoteCase keeps its outline in an SQLite table
//! `nodes(id, parent_id, title, <content>)`. The content column differs
//! between NoteCase variants, see [`CONTENT_COLUMNS`].

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode, OpenFlags};
use tracing::{debug, instrument, warn};

use crate::domain::{Document, NodeId};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::error_ext::IoResultExt;
use crate::infrastructure::UNTITLED;

pub const EXTENSION: &str = "ncd";

pub const IMPORT_ROOT_NAME: &str = "Imported NoteCase";

/// Content column names, in the order they are tried.
pub const CONTENT_COLUMNS: &[&str] = &["html_content", "rtf_content"];

/// Row identifier as stored; SQLite columns are dynamically typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RowKey {
    Integer(i64),
    Real(u64),
    Text(String),
    Blob(Vec<u8>),
}

impl RowKey {
    fn from_value(value: ValueRef<'_>) -> Option<Self> {
        match value {
            ValueRef::Null => None,
            ValueRef::Integer(i) => Some(Self::Integer(i)),
            // 1.0 and 1 name the same row
            ValueRef::Real(f)
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
            {
                Some(Self::Integer(f as i64))
            }
            ValueRef::Real(f) => Some(Self::Real(f.to_bits())),
            ValueRef::Text(t) => Some(Self::Text(String::from_utf8_lossy(t).into_owned())),
            ValueRef::Blob(b) => Some(Self::Blob(b.to_vec())),
        }
    }
}

struct Row {
    id: Option<RowKey>,
    parent: Option<RowKey>,
    title: String,
    content: String,
}

/// String form of any SQLite value, None for NULL.
fn text_of(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn is_store_failure(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt)
    )
}

fn invalid_store(path: &Path, error: rusqlite::Error) -> InfraError {
    InfraError::InvalidStore {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Imports a NoteCase database into a document rooted at [`IMPORT_ROOT_NAME`].
///
/// The database is opened read-only; the connection is released when this
/// function returns, on success and on every error path.
#[instrument(level = "debug")]
pub fn import(path: &Path) -> InfraResult<Document> {
    // Checked up front so SQLite never creates an empty database in its place
    match fs::metadata(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(InfraError::InvalidStore {
                path: path.to_path_buf(),
                message: format!("missing NoteCase file: {e}"),
            });
        }
        other => {
            other.with_path_context("open NoteCase file", path)?;
        }
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| invalid_store(path, e))?;

    // SQLite opens lazily; touching the schema validates the file header
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })
    .map_err(|e| invalid_store(path, e))?;

    let rows = fetch_rows(&conn, path)?;
    let row_count = rows.len();
    let document = build(rows);
    debug!("imported {} rows from {}", row_count, path.display());
    Ok(document)
}

fn fetch_rows(conn: &Connection, path: &Path) -> InfraResult<Vec<Row>> {
    let mut attempts = Vec::with_capacity(CONTENT_COLUMNS.len());
    for column in CONTENT_COLUMNS {
        match query_rows(conn, column) {
            Ok(rows) => {
                debug!("content column: {}", column);
                return Ok(rows);
            }
            Err(e) if is_store_failure(&e) => return Err(invalid_store(path, e)),
            Err(e) => {
                debug!("content column {} rejected: {}", column, e);
                attempts.push(format!("{column}: {e}"));
            }
        }
    }
    Err(InfraError::MissingSchema {
        path: path.to_path_buf(),
        message: attempts.join("; "),
    })
}

fn query_rows(conn: &Connection, column: &str) -> rusqlite::Result<Vec<Row>> {
    let sql = format!("SELECT id, parent_id, title, {column} FROM nodes ORDER BY parent_id, id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Row {
                id: RowKey::from_value(row.get_ref(0)?),
                parent: RowKey::from_value(row.get_ref(1)?),
                title: text_of(row.get_ref(2)?)
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| UNTITLED.to_string()),
                content: text_of(row.get_ref(3)?).unwrap_or_default(),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>();
    rows
}

/// Two passes: one node per row, then attach each to its parent row's node.
///
/// Rows without a parent, with an unknown parent, or whose parent link would
/// close a cycle hang directly off the import root.
fn build(rows: Vec<Row>) -> Document {
    let mut document = Document::new(IMPORT_ROOT_NAME);
    let root = document.root();
    let mut by_key: HashMap<RowKey, NodeId> = HashMap::with_capacity(rows.len());
    let mut pending = Vec::with_capacity(rows.len());

    for row in rows {
        let id = document.create_node(row.title, row.content);
        if let Some(key) = row.id {
            by_key.insert(key, id);
        }
        pending.push((id, row.parent));
    }

    for (id, parent_key) in pending {
        let parent = parent_key.and_then(|key| by_key.get(&key).copied());
        if let Some(parent) = parent {
            match document.add_child(parent, id) {
                Ok(()) => continue,
                Err(e) => warn!("re-rooting NoteCase row: {}", e),
            }
        }
        if let Err(e) = document.add_child(root, id) {
            warn!("dropping NoteCase row: {}", e);
        }
    }
    document
}
