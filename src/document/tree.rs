//! A single parsed definition document.
//!
//! `Document` pairs the archive entry name a tree was parsed from with its root
//! element. Nodes inside a document can be addressed by child-index paths,
//! which is how the snapshot indices refer to them.
//!
//! # Example
//!
//! ```
//! use defquill::document::node::Element;
//! use defquill::document::tree::Document;
//!
//! let root = Element::new("Defs")
//!     .with_child(Element::new("ThingDef").with_attribute("Name", "ResourceBase"))
//!     .into_node();
//! let doc = Document::new("Defs/Items.xml", root);
//!
//! let base = doc.get_node(&[0]).unwrap();
//! assert_eq!(base.attribute("Name"), Some("ResourceBase"));
//! assert!(doc.get_node(&[3]).is_none());
//! ```

use super::node::Node;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: String,
    root: Node,
}

impl Document {
    pub fn new(id: impl Into<String>, root: Node) -> Self {
        Self {
            id: id.into(),
            root,
        }
    }

    /// Returns the source identifier (archive entry name).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the root element.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Gets the node at the given path below the root.
    ///
    /// Each index selects the nth child (text nodes included) at that level.
    /// Returns `None` if the path runs out of bounds or into a text node.
    pub fn get_node(&self, path: &[usize]) -> Option<&Node> {
        self.root.get(path)
    }

    /// Visits every node in pre-order together with its path from the root.
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&[usize], &'a Node),
    {
        fn walk_node<'a, F>(node: &'a Node, path: &mut Vec<usize>, visit: &mut F)
        where
            F: FnMut(&[usize], &'a Node),
        {
            visit(path, node);
            for (index, child) in node.children().iter().enumerate() {
                path.push(index);
                walk_node(child, path, visit);
                path.pop();
            }
        }

        let mut path = Vec::new();
        walk_node(&self.root, &mut path, &mut visit);
    }

    /// Total number of nodes in the document.
    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::Element;

    #[test]
    fn test_walk_is_preorder_with_paths() {
        let root = Element::new("Defs")
            .with_child(Element::new("A").with_child(Element::new("B")))
            .with_child(Element::new("C"))
            .into_node();
        let doc = Document::new("x.xml", root);

        let mut seen = Vec::new();
        doc.walk(|path, node| seen.push((path.to_vec(), node.tag().unwrap().to_string())));

        assert_eq!(
            seen,
            vec![
                (vec![], "Defs".to_string()),
                (vec![0], "A".to_string()),
                (vec![0, 0], "B".to_string()),
                (vec![1], "C".to_string()),
            ]
        );
        assert_eq!(doc.node_count(), 4);
    }
}
