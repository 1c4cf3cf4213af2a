//! The in-memory document database.
//!
//! A `DocumentStore` owns the current `Snapshot`: the full list of parsed
//! documents plus name indices built from them. Reloading parses a complete new
//! snapshot off to the side and swaps it in only when every entry parsed, so
//! readers see either the old snapshot or the new one, never a mix.
//!
//! Readers grab an `Arc<Snapshot>` and keep it for the whole query; a reload
//! that lands meanwhile does not affect them.
//!
//! # Example
//!
//! ```
//! use defquill::document::store::DocumentStore;
//!
//! let store = DocumentStore::new();
//! assert!(store.snapshot().documents().is_empty());
//! assert_eq!(store.generation(), 0);
//! ```

use super::node::Node;
use super::tree::Document;
use crate::file::loader::parse_archive;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::info;

/// Errors that abort a reload.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Failed to read archive entry '{entry}': {source}")]
    Read {
        entry: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Archive entry '{entry}' is not valid UTF-8")]
    Encoding {
        entry: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("Failed to parse '{entry}': {source}")]
    Parse {
        entry: String,
        #[source]
        source: super::parser::XmlError,
    },
}

/// Location of a node: document index plus child-index path below its root.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeLocation {
    document: usize,
    path: Vec<usize>,
}

/// One complete, immutable state of the database.
#[derive(Debug, Default)]
pub struct Snapshot {
    documents: Vec<Document>,
    /// (tag, Name attribute) -> first element carrying it
    by_name: HashMap<(String, String), NodeLocation>,
    /// (tag, defName child text) -> first element carrying it
    by_def_name: HashMap<(String, String), NodeLocation>,
}

impl Snapshot {
    /// Builds a snapshot and its name indices from parsed documents.
    pub fn new(documents: Vec<Document>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_def_name = HashMap::new();

        for (index, document) in documents.iter().enumerate() {
            document.walk(|path, node| {
                let Some(tag) = node.tag() else {
                    return;
                };
                let location = || NodeLocation {
                    document: index,
                    path: path.to_vec(),
                };
                if let Some(name) = node.attribute("Name") {
                    by_name
                        .entry((tag.to_string(), name.to_string()))
                        .or_insert_with(location);
                }
                if let Some(def_name) = node.child_text("defName") {
                    by_def_name
                        .entry((tag.to_string(), def_name))
                        .or_insert_with(location);
                }
            });
        }

        Self {
            documents,
            by_name,
            by_def_name,
        }
    }

    /// Returns the documents in archive enumeration order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Total number of nodes across all documents.
    pub fn node_count(&self) -> usize {
        self.documents.iter().map(Document::node_count).sum()
    }

    /// Finds the first element with `tag` whose `Name` attribute is exactly `name`.
    ///
    /// Documents are searched in store order, nodes in pre-order. A missing
    /// name is not an error.
    pub fn resolve_by_name(&self, tag: &str, name: &str) -> Option<&Node> {
        self.by_name
            .get(&(tag.to_string(), name.to_string()))
            .and_then(|location| self.node_at(location))
    }

    /// Finds the first element with `tag` whose `defName` child text is `def_name`.
    pub fn resolve_by_def_name(&self, tag: &str, def_name: &str) -> Option<&Node> {
        self.by_def_name
            .get(&(tag.to_string(), def_name.to_string()))
            .and_then(|location| self.node_at(location))
    }

    fn node_at(&self, location: &NodeLocation) -> Option<&Node> {
        self.documents
            .get(location.document)?
            .get_node(&location.path)
    }
}

/// The documents of one pinned snapshot; derefs to `[Document]`.
#[derive(Debug, Clone)]
pub struct Documents(Arc<Snapshot>);

impl Documents {
    /// The snapshot the documents belong to.
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.0
    }
}

impl Deref for Documents {
    type Target = [Document];

    fn deref(&self) -> &[Document] {
        self.0.documents()
    }
}

/// Owner of the current snapshot, with serialized reloads.
#[derive(Debug, Default)]
pub struct DocumentStore {
    current: RwLock<Arc<Snapshot>>,
    reload: Mutex<()>,
    generation: AtomicU64,
}

impl DocumentStore {
    /// Creates an empty store (generation 0, no documents).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding the given documents.
    pub fn with_documents(documents: Vec<Document>) -> Self {
        let store = Self::new();
        store.replace(Snapshot::new(documents));
        store
    }

    /// Replaces the whole database with the `.xml` entries of a zip archive.
    ///
    /// # Errors
    ///
    /// Returns a `LoadError` if the archive is unreadable or any `.xml` entry
    /// fails to decode or parse. The previous snapshot stays in place.
    pub fn load(&self, archive: &[u8]) -> Result<(), LoadError> {
        let _reload = self.reload.lock().unwrap_or_else(PoisonError::into_inner);

        let documents = parse_archive(archive)?;
        let snapshot = Snapshot::new(documents);
        info!(
            documents = snapshot.documents().len(),
            nodes = snapshot.node_count(),
            "parsed archive"
        );
        self.replace(snapshot);
        Ok(())
    }

    fn replace(&self, snapshot: Snapshot) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(snapshot);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(generation, "swapped in new snapshot");
    }

    /// Returns a handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the current documents in archive order.
    ///
    /// The handle keeps its snapshot alive, so the list stays the same even if
    /// a reload lands while it is held.
    pub fn documents(&self) -> Documents {
        Documents(self.snapshot())
    }

    /// Number of successful loads so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
