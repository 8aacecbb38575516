//! CherryTree (`.ctd`) importer
//!
//! A CherryTree document is XML: nested `node` elements carrying a `name`
//! attribute, with text either in a `rich_text` attribute or in `rich_text`
//! child elements. Only `node` elements directly under the document element
//! or under another `node` are converted.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{Document, NodeId};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::error_ext::IoResultExt;
use crate::infrastructure::UNTITLED;

pub const EXTENSION: &str = "ctd";

pub const IMPORT_ROOT_NAME: &str = "Imported CherryTree";

const NODE_TAG: &[u8] = b"node";
const RICH_TEXT_TAG: &[u8] = b"rich_text";

#[derive(Error, Debug)]
#[error("{message} (near byte {position})")]
pub struct CherryTreeError {
    pub message: String,
    pub position: u64,
}

/// Where the reader currently is in the element tree.
enum Frame {
    /// The document element, whatever its tag
    Document,
    /// A converted `node` element
    Node { id: NodeId, has_content: bool },
    /// The `rich_text` element supplying its owner's content
    RichText { owner: NodeId },
    /// Anything else; its subtree is ignored
    Skipped,
}

#[instrument(level = "debug")]
pub fn import(path: &Path) -> InfraResult<Document> {
    let bytes = fs::read(path).with_path_context("read CherryTree file", path)?;
    let xml_error = |message: String| InfraError::Xml {
        path: path.to_path_buf(),
        message,
    };
    let xml = std::str::from_utf8(&bytes).map_err(|e| xml_error(e.to_string()))?;
    let document = parse(xml).map_err(|e| xml_error(e.to_string()))?;
    debug!(
        "imported {} nodes from {}",
        document.node_count() - 1,
        path.display()
    );
    Ok(document)
}

/// Converts CherryTree XML into a document rooted at [`IMPORT_ROOT_NAME`].
pub fn parse(xml: &str) -> Result<Document, CherryTreeError> {
    let mut reader = Reader::from_str(xml);
    let mut document = Document::new(IMPORT_ROOT_NAME);
    let mut stack: Vec<Frame> = Vec::new();
    let mut seen_root = false;

    loop {
        let position = reader.buffer_position() as u64;
        let fail = |message: String| CherryTreeError { message, position };

        match reader.read_event().map_err(|e| fail(e.to_string()))? {
            Event::Start(element) => {
                let frame = open(&mut document, stack.last_mut(), &element, seen_root)
                    .map_err(fail)?;
                seen_root = true;
                stack.push(frame);
            }
            Event::Empty(element) => {
                open(&mut document, stack.last_mut(), &element, seen_root).map_err(fail)?;
                seen_root = true;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(text) => {
                if stack.is_empty() {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(fail("text outside the document element".to_string()));
                    }
                    continue;
                }
                let text = text.unescape().map_err(|e| fail(e.to_string()))?;
                if let Some(Frame::RichText { owner }) = stack.last() {
                    append_content(&mut document, *owner, &text);
                }
            }
            Event::CData(data) => {
                if stack.is_empty() {
                    return Err(fail("CDATA outside the document element".to_string()));
                }
                if let Some(Frame::RichText { owner }) = stack.last() {
                    let text = std::str::from_utf8(&data).map_err(|e| fail(e.to_string()))?;
                    append_content(&mut document, *owner, text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let position = reader.buffer_position() as u64;
    if !seen_root {
        return Err(CherryTreeError {
            message: "no element found".to_string(),
            position,
        });
    }
    if !stack.is_empty() {
        return Err(CherryTreeError {
            message: format!("document ends inside {} open element(s)", stack.len()),
            position,
        });
    }
    Ok(document)
}

/// Decides what an opening tag means given the enclosing frame.
fn open(
    document: &mut Document,
    parent: Option<&mut Frame>,
    element: &BytesStart<'_>,
    seen_root: bool,
) -> Result<Frame, String> {
    check_attributes(element)?;
    let tag = element.name();
    let root = document.root();
    let frame = match parent {
        None if seen_root => {
            return Err(format!(
                "element <{}> after the document element",
                String::from_utf8_lossy(tag.as_ref())
            ))
        }
        None => Frame::Document,
        Some(Frame::Document) if tag.as_ref() == NODE_TAG => {
            new_node(document, root, element)?
        }
        Some(Frame::Node { id, .. }) if tag.as_ref() == NODE_TAG => {
            new_node(document, *id, element)?
        }
        Some(Frame::Node { id, has_content }) if tag.as_ref() == RICH_TEXT_TAG && !*has_content => {
            *has_content = true;
            Frame::RichText { owner: *id }
        }
        Some(_) => Frame::Skipped,
    };
    Ok(frame)
}

fn new_node(document: &mut Document, parent: NodeId, element: &BytesStart<'_>) -> Result<Frame, String> {
    let name = attribute(element, "name")?.unwrap_or_else(|| UNTITLED.to_string());
    // An empty attribute falls through to the rich_text child element
    let content = attribute(element, "rich_text")?.unwrap_or_default();
    let has_content = !content.is_empty();
    let id = document.push_child(parent, name, content);
    Ok(Frame::Node { id, has_content })
}

/// Well-formedness of every attribute, whether or not the element is used:
/// no duplicates, no raw `<`, only known entities.
fn check_attributes(element: &BytesStart<'_>) -> Result<(), String> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.value.contains(&b'<') {
            return Err(format!(
                "'<' in value of attribute {}",
                String::from_utf8_lossy(attr.key.as_ref())
            ));
        }
        attr.unescape_value().map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn attribute(element: &BytesStart<'_>, key: &str) -> Result<Option<String>, String> {
    let Some(attr) = element.try_get_attribute(key).map_err(|e| e.to_string())? else {
        return Ok(None);
    };
    let value = attr.unescape_value().map_err(|e| e.to_string())?;
    Ok(Some(value.into_owned()))
}

fn append_content(document: &mut Document, owner: NodeId, text: &str) {
    if let Some(node) = document.get_mut(owner) {
        node.content.push_str(text);
    }
}
