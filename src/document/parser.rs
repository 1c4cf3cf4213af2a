//! XML parsing into definition document trees.
//!
//! The parser drives `quick_xml`'s pull reader and builds `Node` trees with an
//! explicit element stack. Whitespace-only text between elements is dropped,
//! comments, processing instructions and the XML declaration are ignored, and
//! CDATA sections become ordinary text nodes.
//!
//! # Example
//!
//! ```
//! use defquill::document::parser::parse_document;
//!
//! let xml = r#"<?xml version="1.0" encoding="utf-8"?>
//! <Defs>
//!   <ThingDef ParentName="ResourceBase">
//!     <defName>Steel</defName>
//!   </ThingDef>
//! </Defs>"#;
//! let doc = parse_document("Defs/Items.xml", xml).unwrap();
//!
//! let def = doc.get_node(&[0]).unwrap();
//! assert_eq!(def.child_text("defName").as_deref(), Some("Steel"));
//! ```

use super::node::{Element, Node};
use super::tree::Document;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Errors raised while turning markup into a document tree.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("XML syntax error at byte {position}: {source}")]
    Syntax {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("malformed document: {0}")]
    Structure(String),
}

/// Parses a complete XML document.
///
/// # Errors
///
/// Returns an error if the markup is not well-formed, has no root element,
/// has more than one root element or ends with unclosed elements.
pub fn parse_document(id: &str, source: &str) -> Result<Document, XmlError> {
    let mut reader = Reader::from_str(source);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader.read_event().map_err(|source| XmlError::Syntax {
            position: reader.buffer_position() as u64,
            source,
        })?;

        match event {
            Event::Start(start) => {
                stack.push(element_from(&start, &reader)?);
            }
            Event::Empty(start) => {
                let element = element_from(&start, &reader)?;
                attach(&mut stack, &mut root, Node::Element(element))?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    XmlError::Structure("closing tag without matching opening tag".to_string())
                })?;
                attach(&mut stack, &mut root, Node::Element(element))?;
            }
            Event::Text(text) => {
                let content = text.unescape().map_err(|source| XmlError::Syntax {
                    position: reader.buffer_position() as u64,
                    source,
                })?;
                push_text(&mut stack, &content)?;
            }
            Event::CData(data) => {
                let content = String::from_utf8_lossy(&data.into_inner()).into_owned();
                match stack.last_mut() {
                    Some(parent) if !content.is_empty() => parent.children.push(Node::Text(content)),
                    _ => push_text(&mut stack, &content)?,
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Structure(format!(
            "unexpected end of document inside <{}>",
            open.tag
        )));
    }

    let root = root.ok_or_else(|| XmlError::Structure("document has no root element".to_string()))?;
    Ok(Document::new(id, root))
}

fn element_from(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element, XmlError> {
    let syntax = |source: quick_xml::Error| XmlError::Syntax {
        position: reader.buffer_position() as u64,
        source,
    };

    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(tag);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| syntax(err.into()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(syntax)?.into_owned();
        element.attributes.insert(key, value);
    }
    Ok(element)
}

/// Adds a finished node to the open parent, or makes it the root.
fn attach(stack: &mut [Element], root: &mut Option<Node>, node: Node) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::Structure(
            "document has more than one root element".to_string(),
        ));
    }
    *root = Some(node);
    Ok(())
}

/// Appends text to the open element. Whitespace-only runs are layout and are
/// dropped; any other text is kept verbatim.
fn push_text(stack: &mut [Element], content: &str) -> Result<(), XmlError> {
    if content.trim().is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Text(content.to_string()));
            Ok(())
        }
        None => Err(XmlError::Structure(
            "text content outside of the root element".to_string(),
        )),
    }
}
