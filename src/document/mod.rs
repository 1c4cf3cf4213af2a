//! Definition documents and the store that holds them.
//!
//! - [`node`]: the element/text tree of one XML document
//! - [`tree`]: a named document plus path-based access
//! - [`parser`]: XML text to [`tree::Document`]
//! - [`store`]: immutable snapshots of all documents, swapped atomically on reload

pub mod node;
pub mod parser;
pub mod store;
pub mod tree;
