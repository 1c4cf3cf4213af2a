//! Name and inheritance resolution for definitions.
//!
//! Name lookups themselves live on [`Snapshot`](crate::document::store::Snapshot)
//! (`resolve_by_name`, `resolve_by_def_name`); this module builds on them to
//! walk `ParentName` chains and to assemble item reports.

pub mod inherit;
pub mod item;

pub use inherit::{
    Ancestors, ChainEnd, ColorScale, DisplayColor, Field, FieldGroup, FieldView,
    InheritanceResolver, ParsedColor,
};
pub use item::{validate_item_name, ItemLookup, ItemReport, ItemStats, LookupError, StuffReport};
