//! LTS1 binary document format
//!
//! ```text
//! file  := "LTS1" node
//! node  := str(name) str(content) u32(child_count) node{child_count}
//! str   := u32(byte_len) utf8_bytes
//! ```
//!
//! Integers are big-endian u32, nodes are written depth-first, pre-order.
//! There is no size header, checksum or version beyond the magic.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::domain::{Document, NodeId};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::error_ext::IoResultExt;

pub const MAGIC: &[u8; 4] = b"LTS1";

pub const EXTENSION: &str = "lts";

/// Field of the encoding being read or written when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LtsField {
    Magic,
    NameLength,
    NameData,
    ContentLength,
    ContentData,
    ChildCount,
}

impl fmt::Display for LtsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LtsField::Magic => "magic number",
            LtsField::NameLength => "node name length",
            LtsField::NameData => "node name data",
            LtsField::ContentLength => "node content length",
            LtsField::ContentData => "node content data",
            LtsField::ChildCount => "number of children",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum LtsError {
    #[error("incorrect magic number \"{}\", expected \"LTS1\"", .found.escape_ascii())]
    BadMagic { found: Vec<u8> },

    #[error("unexpected end of data while reading {field} at depth {depth} (expected {expected} bytes, got {got})")]
    Truncated {
        field: LtsField,
        depth: usize,
        expected: u64,
        got: u64,
    },

    #[error("{field} at depth {depth} is not valid UTF-8")]
    InvalidUtf8 {
        field: LtsField,
        depth: usize,
        #[source]
        source: FromUtf8Error,
    },

    #[error("{field} of {len} does not fit a 4-byte prefix")]
    TooLong { field: LtsField, len: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LtsError {
    /// The field being processed when decoding stopped, if known.
    pub fn field(&self) -> Option<LtsField> {
        match self {
            LtsError::BadMagic { .. } => Some(LtsField::Magic),
            LtsError::Truncated { field, .. }
            | LtsError::InvalidUtf8 { field, .. }
            | LtsError::TooLong { field, .. } => Some(*field),
            LtsError::Io(_) => None,
        }
    }
}

/// Writes the whole document, root first.
#[instrument(level = "debug", skip_all)]
pub fn encode<W: Write>(document: &Document, writer: &mut W) -> Result<(), LtsError> {
    writer.write_all(MAGIC)?;
    // Pre-order with a child count after each header is exactly the layout
    for (_, node, _) in document.iter() {
        write_str(writer, &node.name, LtsField::NameLength)?;
        write_str(writer, &node.content, LtsField::ContentLength)?;
        write_u32(writer, node.children().len(), LtsField::ChildCount)?;
    }
    Ok(())
}

fn write_u32<W: Write>(writer: &mut W, value: usize, field: LtsField) -> Result<(), LtsError> {
    let value = u32::try_from(value).map_err(|_| LtsError::TooLong { field, len: value })?;
    writer.write_all(&value.to_be_bytes())?;
    Ok(())
}

fn write_str<W: Write>(writer: &mut W, text: &str, field: LtsField) -> Result<(), LtsError> {
    write_u32(writer, text.len(), field)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Reads one document. All-or-nothing: any error discards the partial tree.
#[instrument(level = "debug", skip_all)]
pub fn decode<R: Read>(reader: &mut R) -> Result<Document, LtsError> {
    let magic = read_bytes(reader, 4, LtsField::Magic, 0)?;
    if magic.as_slice() != &MAGIC[..] {
        return Err(LtsError::BadMagic { found: magic });
    }

    let (name, content, count) = read_header(reader, 0)?;
    let mut document = Document::with_content(name, content);
    let mut stack: Vec<(NodeId, u32)> = vec![(document.root(), count)];

    while let Some(top) = stack.last_mut() {
        if top.1 == 0 {
            stack.pop();
            continue;
        }
        top.1 -= 1;
        let parent = top.0;
        let depth = stack.len();
        let (name, content, count) = read_header(reader, depth)?;
        let id = document.push_child(parent, name, content);
        stack.push((id, count));
    }

    debug!(
        "decoded {} nodes, depth {}",
        document.node_count(),
        document.depth()
    );
    Ok(document)
}

fn read_header<R: Read>(reader: &mut R, depth: usize) -> Result<(String, String, u32), LtsError> {
    let name = read_str(reader, LtsField::NameLength, LtsField::NameData, depth)?;
    let content = read_str(reader, LtsField::ContentLength, LtsField::ContentData, depth)?;
    let count = read_u32(reader, LtsField::ChildCount, depth)?;
    Ok((name, content, count))
}

/// Reads exactly `len` bytes without trusting `len` for allocation.
fn read_bytes<R: Read>(
    reader: &mut R,
    len: u64,
    field: LtsField,
    depth: usize,
) -> Result<Vec<u8>, LtsError> {
    let mut buf = Vec::new();
    reader.by_ref().take(len).read_to_end(&mut buf)?;
    let got = buf.len() as u64;
    if got < len {
        return Err(LtsError::Truncated {
            field,
            depth,
            expected: len,
            got,
        });
    }
    Ok(buf)
}

fn read_u32<R: Read>(reader: &mut R, field: LtsField, depth: usize) -> Result<u32, LtsError> {
    let bytes = read_bytes(reader, 4, field, depth)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_str<R: Read>(
    reader: &mut R,
    length_field: LtsField,
    data_field: LtsField,
    depth: usize,
) -> Result<String, LtsError> {
    let len = read_u32(reader, length_field, depth)?;
    let bytes = read_bytes(reader, u64::from(len), data_field, depth)?;
    String::from_utf8(bytes).map_err(|source| LtsError::InvalidUtf8 {
        field: data_field,
        depth,
        source,
    })
}

pub fn to_bytes(document: &Document) -> Result<Vec<u8>, LtsError> {
    let mut bytes = Vec::new();
    encode(document, &mut bytes)?;
    Ok(bytes)
}

/// Decodes a complete buffer. Bytes after the root record are ignored.
pub fn from_bytes(bytes: &[u8]) -> Result<Document, LtsError> {
    let mut cursor = bytes;
    let document = decode(&mut cursor)?;
    if !cursor.is_empty() {
        warn!("ignoring {} trailing bytes after LTS document", cursor.len());
    }
    Ok(document)
}

/// `path` itself if it already ends in `.lts`, else `path` + `.lts`.
pub fn with_lts_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case(EXTENSION) => path.to_path_buf(),
        _ => {
            let mut raw = path.as_os_str().to_owned();
            raw.push(".");
            raw.push(EXTENSION);
            PathBuf::from(raw)
        }
    }
}

#[instrument(level = "debug")]
pub fn load(path: &Path) -> InfraResult<Document> {
    let bytes = fs::read(path).with_path_context("read LTS file", path)?;
    from_bytes(&bytes).map_err(|source| InfraError::Lts {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves atomically and returns the path actually written.
#[instrument(level = "debug", skip(document))]
pub fn save(document: &Document, path: &Path) -> InfraResult<PathBuf> {
    let path = with_lts_extension(path);
    let bytes = to_bytes(document).map_err(|source| InfraError::Lts {
        path: path.clone(),
        source,
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).with_path_context("create temp file in", dir)?;
    file.write_all(&bytes).with_path_context("write LTS file", &path)?;
    file.persist(&path)
        .map_err(|e| InfraError::io(format!("save LTS file: {}", path.display()), e.error))?;

    debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample() -> Document {
        let mut document = Document::new("R");
        document.add_node(document.root(), "C", "hi").unwrap();
        document
    }

    #[test]
    fn given_small_tree_when_encoding_then_matches_layout() {
        let bytes = to_bytes(&sample()).unwrap();
        let expected: Vec<u8> = [
            &b"LTS1"[..],
            &[0, 0, 0, 1],
            b"R",
            &[0, 0, 0, 0],
            &[0, 0, 0, 1],
            &[0, 0, 0, 1],
            b"C",
            &[0, 0, 0, 2],
            b"hi",
            &[0, 0, 0, 0],
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn given_encoded_tree_when_decoding_then_names_and_content_survive() {
        let document = from_bytes(&to_bytes(&sample()).unwrap()).unwrap();
        let root = document.root_node();
        assert_eq!(root.name, "R");
        let child = document.get(root.children()[0]).unwrap();
        assert_eq!(child.name, "C");
        assert_eq!(child.content, "hi");
    }

    #[test]
    fn given_wrong_magic_when_decoding_then_bad_magic() {
        let mut bytes = to_bytes(&sample()).unwrap();
        bytes[3] = b'2';
        let err = from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, LtsError::BadMagic { .. }));
        assert!(err.to_string().contains("LTS2"));
    }

    #[rstest]
    #[case(2, LtsField::Magic, 0)]
    #[case(6, LtsField::NameLength, 0)]
    #[case(8, LtsField::NameData, 0)]
    #[case(10, LtsField::ContentLength, 0)]
    #[case(14, LtsField::ChildCount, 0)]
    #[case(20, LtsField::NameLength, 1)]
    #[case(23, LtsField::ContentLength, 1)]
    #[case(27, LtsField::ContentData, 1)]
    #[case(31, LtsField::ChildCount, 1)]
    fn given_truncated_bytes_when_decoding_then_names_field_and_depth(
        #[case] cut: usize,
        #[case] field: LtsField,
        #[case] depth: usize,
    ) {
        let bytes = to_bytes(&sample()).unwrap();
        match from_bytes(&bytes[..cut]) {
            Err(LtsError::Truncated {
                field: f, depth: d, ..
            }) => {
                assert_eq!(f, field);
                assert_eq!(d, depth);
            }
            other => panic!("expected truncation error, got {other:?}"),
        }
    }

    #[test]
    fn given_invalid_utf8_name_when_decoding_then_format_error() {
        let bytes = [&b"LTS1"[..], &[0, 0, 0, 1], &[0xff], &[0, 0, 0, 0], &[0, 0, 0, 0]].concat();
        let err = from_bytes(&bytes).unwrap_err();
        assert_eq!(err.field(), Some(LtsField::NameData));
    }

    #[test]
    fn given_trailing_bytes_when_decoding_then_ignored() {
        let mut bytes = to_bytes(&sample()).unwrap();
        bytes.extend_from_slice(b"junk");
        assert_eq!(from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn given_huge_length_prefix_when_decoding_then_truncated_not_oom() {
        let bytes = [&b"LTS1"[..], &[0xff, 0xff, 0xff, 0xff], b"abc"].concat();
        let err = from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            LtsError::Truncated {
                field: LtsField::NameData,
                expected: 0xffff_ffff,
                got: 3,
                ..
            }
        ));
    }

    #[rstest]
    #[case("notes", "notes.lts")]
    #[case("notes.lts", "notes.lts")]
    #[case("notes.LTS", "notes.LTS")]
    #[case("notes.txt", "notes.txt.lts")]
    fn given_path_when_adding_extension_then_appends_only_when_missing(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(with_lts_extension(Path::new(input)), PathBuf::from(expected));
    }
}
