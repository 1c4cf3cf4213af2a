//! Archive I/O for definition databases.
//!
//! This module reads zip archives of XML definition files, either from bytes
//! already in memory or from a file on disk, and turns their `.xml` entries
//! into parsed documents.

pub mod loader;
