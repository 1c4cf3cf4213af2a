//! XPath-style query parser and evaluator for definition documents.
//!
//! This module implements the subset of XPath the definition database needs:
//! enough to select definitions by tag path and simple predicates, without a
//! general expression language.
//!
//! # Supported Syntax
//!
//! - `Defs/ThingDef` - child steps, relative to the document node
//! - `/Defs` - absolute paths; `/` alone selects each document's root element
//! - `//label`, `Defs//label` - descendants, in document order
//! - `*` - any element, `.` - the context node, `text()` - text nodes
//! - `[@Name="x"]` - attribute comparison
//! - `[defName="x"]`, `[stuffProps/color]` - child text comparison and existence
//! - `=`, `!=`, `and`, `or`, parentheses
//! - `translate(s, from, to)`, `contains(s, part)`, `not(x)`
//!
//! # Examples
//!
//! ```text
//! Defs/ThingDef[defName="Steel"]/description
//! Defs/ThingDef[@Name="BuildingBase"]
//! Defs/ThingDef[contains(label, "wood")]
//! //*
//! ```

pub mod ast;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use ast::{Axis, Expr, LocationPath, NodeTest, Step};
pub use engine::{dedup_matches, Match, QueryEngine};
pub use error::QueryError;
pub use evaluator::Evaluator;
pub use parser::Parser;
