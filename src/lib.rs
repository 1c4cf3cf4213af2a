//! defquill: XPath queries and inheritance-aware item reports over game
//! definition archives.
//!
//! An archive is a zip of XML definition files. It is loaded into a
//! [`document::store::DocumentStore`]; queries run against an immutable
//! snapshot through [`xpath::QueryEngine`], and
//! [`resolver::InheritanceResolver`] merges fields along `ParentName` chains.

pub mod config;
pub mod document;
pub mod file;
pub mod format;
pub mod resolver;
pub mod xpath;
