//! XML node representation for definition documents.
//!
//! Every parsed document is a tree of `Node`s. Elements keep their attributes
//! in declaration order and their children in document order; text content is
//! stored in separate `Text` nodes. Trees are built once by the parser and never
//! mutated afterwards.
//!
//! # Example
//!
//! ```
//! use defquill::document::node::{Element, Node};
//!
//! let def = Element::new("ThingDef")
//!     .with_attribute("ParentName", "ResourceBase")
//!     .with_child(Element::new("defName").with_text("Steel"))
//!     .into_node();
//!
//! assert_eq!(def.tag(), Some("ThingDef"));
//! assert_eq!(def.attribute("ParentName"), Some("ResourceBase"));
//! assert_eq!(def.child_text("defName").as_deref(), Some("Steel"));
//! ```

use indexmap::IndexMap;
use quick_xml::escape::escape;

/// An XML element: tag, ordered attributes and ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Node>,
}

/// A node in a definition document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An element with its attributes and children
    Element(Element),
    /// Character data (text or CDATA)
    Text(String),
}

impl Element {
    /// Creates an empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute, replacing any previous value under the same key.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Appends a text child.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn into_node(self) -> Node {
        Node::Element(self)
    }
}

impl Node {
    /// Returns the element tag, or `None` for text nodes.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element(element) => Some(&element.tag),
            Node::Text(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Returns the value of the named attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.as_element()
            .and_then(|element| element.attributes.get(name))
            .map(String::as_str)
    }

    /// Returns all children, or an empty slice for text nodes.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Text(_) => &[],
        }
    }

    /// Iterates over the element children only, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Node> {
        self.children().iter().filter(|child| child.is_element())
    }

    /// Returns the first child element with the given tag.
    pub fn first_child(&self, tag: &str) -> Option<&Node> {
        self.child_elements().find(|child| child.tag() == Some(tag))
    }

    /// Returns the text of the first child element with the given tag.
    pub fn child_text(&self, tag: &str) -> Option<String> {
        self.first_child(tag).map(Node::text)
    }

    /// Returns the string-value of the node: its own content for text nodes,
    /// the concatenated text of all descendants for elements.
    pub fn text(&self) -> String {
        match self {
            Node::Text(content) => content.clone(),
            Node::Element(_) => {
                let mut out = String::new();
                self.collect_text(&mut out);
                out
            }
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(content) => out.push_str(content),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Returns true when every child is a text node (vacuously true for `<a/>`).
    pub fn has_only_text_children(&self) -> bool {
        self.children().iter().all(|child| !child.is_element())
    }

    /// Gets the node at the given child-index path, starting from this node.
    ///
    /// An empty path returns the node itself.
    pub fn get(&self, path: &[usize]) -> Option<&Node> {
        let mut current = self;
        for &index in path {
            current = current.children().get(index)?;
        }
        Some(current)
    }

    /// Counts this node and all of its descendants.
    pub fn count_nodes(&self) -> usize {
        1 + self.children().iter().map(Node::count_nodes).sum::<usize>()
    }

    /// Serializes the node and its subtree as XML markup.
    ///
    /// Elements without children are written in the short `<tag />` form.
    ///
    /// ```
    /// use defquill::document::node::Element;
    ///
    /// let node = Element::new("stuffProps")
    ///     .with_child(Element::new("color").with_text("(1,0.5,0)"))
    ///     .with_child(Element::new("smallVolume"))
    ///     .into_node();
    /// assert_eq!(
    ///     node.outer_xml(),
    ///     "<stuffProps><color>(1,0.5,0)</color><smallVolume /></stuffProps>"
    /// );
    /// ```
    pub fn outer_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        match self {
            Node::Text(content) => out.push_str(&escape(content.as_str())),
            Node::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (key, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape(value.as_str()));
                    out.push('"');
                }
                if element.children.is_empty() {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for child in &element.children {
                    child.write_xml(out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steel() -> Node {
        Element::new("ThingDef")
            .with_attribute("ParentName", "ResourceBase")
            .with_child(Element::new("defName").with_text("Steel"))
            .with_child(
                Element::new("statBases")
                    .with_child(Element::new("MaxHitPoints").with_text("100"))
                    .with_child(Element::new("Mass").with_text("0.5")),
            )
            .into_node()
    }

    #[test]
    fn test_first_child_and_text() {
        let node = steel();
        let stats = node.first_child("statBases").unwrap();
        assert_eq!(stats.child_elements().count(), 2);
        assert_eq!(stats.text(), "1000.5");
        assert!(node.first_child("stuffProps").is_none());
    }

    #[test]
    fn test_get_by_path() {
        let node = steel();
        let mass = node.get(&[1, 1]).unwrap();
        assert_eq!(mass.tag(), Some("Mass"));
        assert!(node.get(&[5]).is_none());
        assert_eq!(node.get(&[]).unwrap(), &node);
    }

    #[test]
    fn test_outer_xml_escapes() {
        let node = Element::new("label")
            .with_attribute("Note", "a\"b")
            .with_text("fish & chips <hot>")
            .into_node();
        assert_eq!(
            node.outer_xml(),
            "<label Note=\"a&quot;b\">fish &amp; chips &lt;hot&gt;</label>"
        );
    }

    #[test]
    fn test_text_only_children() {
        assert!(Element::new("a").with_text("x").into_node().has_only_text_children());
        assert!(!steel().has_only_text_children());
        assert_eq!(steel().count_nodes(), 8);
    }
}
