//! Inheritance resolution along `ParentName` chains.
//!
//! A definition names its parent with a `ParentName` attribute; the parent is
//! the element of the same tag whose `Name` attribute matches. Field groups are
//! merged from the most-derived definition upwards: the first definition that
//! declares a field wins, so derived values override inherited ones.
//!
//! # Example
//!
//! ```
//! use defquill::document::node::Element;
//! use defquill::document::store::Snapshot;
//! use defquill::document::tree::Document;
//! use defquill::resolver::{FieldGroup, InheritanceResolver};
//!
//! let defs = Element::new("Defs")
//!     .with_child(
//!         Element::new("ThingDef")
//!             .with_attribute("Name", "Base")
//!             .with_child(Element::new("statBases").with_child(Element::new("Mass").with_text("2"))),
//!     )
//!     .with_child(
//!         Element::new("ThingDef")
//!             .with_attribute("ParentName", "Base")
//!             .with_child(Element::new("defName").with_text("Steel")),
//!     )
//!     .into_node();
//! let snapshot = Snapshot::new(vec![Document::new("Defs.xml", defs)]);
//! let steel = snapshot.documents()[0].get_node(&[1]).unwrap();
//!
//! let resolver = InheritanceResolver::new(&snapshot);
//! let view = resolver.resolve(steel, FieldGroup::BaseStats);
//! assert_eq!(view.pairs(), vec![("Mass", "2")]);
//! assert_eq!(view.visited, 2);
//! ```

use crate::document::node::Node;
use crate::document::store::Snapshot;
use crate::format::{capitalize_first, readable_field_name, signed};
use crate::xpath::{Parser, QueryEngine, QueryError};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Default maximum number of ancestors followed above a definition.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 64;

/// Tag of the definitions that supply stat labels.
const STAT_DEF_TAG: &str = "StatDef";

/// Which nested group of fields to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldGroup {
    /// `statBases`
    BaseStats,
    /// `stuffProps/statFactors`
    StuffFactors,
    /// `stuffProps/statOffsets`
    StuffOffsets,
    /// Scalar fields of `stuffProps`, including `color`
    StuffGeneral,
}

/// How an ancestor walk stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChainEnd {
    /// Reached a definition without `ParentName`
    Root,
    /// `ParentName` named a definition that does not exist
    Dangling(String),
    /// `ParentName` led back to a definition already visited
    Cycle(String),
    /// Stopped after the maximum number of ancestors
    DepthLimit,
}

/// One resolved field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Raw element name, used for override checks
    pub key: String,
    /// Display label
    pub label: String,
    /// Formatted value
    pub value: String,
}

/// How the channels of a color string are scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorScale {
    /// Channels in 0.0..=1.0
    Normalized,
    /// Channels in 0..=255
    Byte,
}

/// The first three channels of a `(r,g,b[,a])` color string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParsedColor {
    pub channels: [f32; 3],
    pub scale: ColorScale,
}

/// An 8-bit RGB color derived from a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ParsedColor {
    /// Parses strings like `(1.0,0.5,0.2,1.0)`, `RGBA(200,100,50,255)` or
    /// `(0.3, 0.3, 0.3)`.
    ///
    /// Any channel above 1.0 switches all three to byte scale.
    ///
    /// ```
    /// use defquill::resolver::{ColorScale, ParsedColor};
    ///
    /// let color = ParsedColor::parse("(1.0,0.5,0.2,1.0)").unwrap();
    /// assert_eq!(color.scale, ColorScale::Normalized);
    ///
    /// let color = ParsedColor::parse("(200,100,50,255)").unwrap();
    /// assert_eq!(color.scale, ColorScale::Byte);
    /// assert!(ParsedColor::parse("(1,2)").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw
            .trim()
            .trim_start_matches(|c: char| "(RGBA".contains(c))
            .trim_end_matches(')');

        let mut parts = trimmed.split(',').map(|part| part.trim().parse::<f32>());
        let mut channel = || parts.next()?.ok();
        let channels = [channel()?, channel()?, channel()?];

        let scale = if channels.iter().any(|&c| c > 1.0) {
            ColorScale::Byte
        } else {
            ColorScale::Normalized
        };
        Some(Self { channels, scale })
    }

    /// Converts to 8-bit channels, saturating out-of-range values.
    pub fn to_rgb(&self) -> DisplayColor {
        let convert = |c: f32| match self.scale {
            ColorScale::Byte => c as u8,
            ColorScale::Normalized => (c * 255.0) as u8,
        };
        DisplayColor {
            r: convert(self.channels[0]),
            g: convert(self.channels[1]),
            b: convert(self.channels[2]),
        }
    }
}

impl DisplayColor {
    /// Formats as `#rrggbb`.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The merged result of resolving one field group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub group: FieldGroup,
    /// Fields in resolution order: derived definitions first
    pub fields: Vec<Field>,
    /// Derived color (only for `StuffGeneral`)
    pub color: Option<DisplayColor>,
    pub chain_end: ChainEnd,
    /// Number of definitions visited, target included
    pub visited: usize,
}

impl FieldView {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `(label, value)` pairs in order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .map(|field| (field.label.as_str(), field.value.as_str()))
            .collect()
    }

    /// `"Label: value"` lines in order.
    pub fn lines(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| format!("{}: {}", field.label, field.value))
            .collect()
    }

    /// Returns the missing parent name if the chain ended on a dangling reference.
    pub fn dangling_parent(&self) -> Option<&str> {
        match &self.chain_end {
            ChainEnd::Dangling(name) => Some(name),
            _ => None,
        }
    }
}

/// Iterator over a definition and its ancestors, most-derived first.
///
/// After the iterator is exhausted, [`end`](Ancestors::end) says why.
pub struct Ancestors<'a> {
    snapshot: &'a Snapshot,
    tag: String,
    current: Option<&'a Node>,
    visited: HashSet<*const Node>,
    max_depth: usize,
    end: Option<ChainEnd>,
}

impl<'a> Ancestors<'a> {
    fn new(snapshot: &'a Snapshot, target: &'a Node, max_depth: usize) -> Self {
        Self {
            snapshot,
            tag: target.tag().unwrap_or_default().to_string(),
            current: Some(target),
            visited: HashSet::new(),
            max_depth,
            end: None,
        }
    }

    /// How the walk stopped; `None` while nodes remain.
    pub fn end(&self) -> Option<&ChainEnd> {
        self.end.as_ref()
    }

    fn parent_of(&mut self, node: &'a Node) -> Option<&'a Node> {
        let Some(parent_name) = node.attribute("ParentName") else {
            self.end = Some(ChainEnd::Root);
            return None;
        };

        let Some(parent) = self.snapshot.resolve_by_name(&self.tag, parent_name) else {
            debug!(tag = %self.tag, parent = parent_name, "dangling ParentName");
            self.end = Some(ChainEnd::Dangling(parent_name.to_string()));
            return None;
        };

        if self.visited.contains(&(parent as *const Node)) {
            warn!(tag = %self.tag, parent = parent_name, "ParentName cycle");
            self.end = Some(ChainEnd::Cycle(parent_name.to_string()));
            return None;
        }

        // visited includes the target, so the parent would be ancestor number visited.len()
        if self.visited.len() > self.max_depth {
            warn!(tag = %self.tag, max_depth = self.max_depth, "ParentName chain too deep");
            self.end = Some(ChainEnd::DepthLimit);
            return None;
        }

        Some(parent)
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.current.take()?;
        self.visited.insert(node as *const Node);
        self.current = self.parent_of(node);
        Some(node)
    }
}

/// Resolves inherited fields for definitions of one snapshot.
pub struct InheritanceResolver<'a> {
    snapshot: &'a Snapshot,
    engine: QueryEngine<'a>,
    max_chain_depth: usize,
}

impl<'a> InheritanceResolver<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            engine: QueryEngine::new(snapshot),
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }

    /// Sets the maximum number of ancestors followed.
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Uses `engine` (and its traversal limit) for sub-path lookups.
    pub fn with_engine(mut self, engine: QueryEngine<'a>) -> Self {
        self.engine = engine;
        self
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    pub fn engine(&self) -> &QueryEngine<'a> {
        &self.engine
    }

    /// Walks `target` and its ancestors, most-derived first.
    pub fn ancestors(&self, target: &'a Node) -> Ancestors<'a> {
        Ancestors::new(self.snapshot, target, self.max_chain_depth)
    }

    /// Merges one field group over the inheritance chain of `target`.
    pub fn resolve(&self, target: &'a Node, group: FieldGroup) -> FieldView {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        let mut color = None;
        let mut visited = 0;

        let mut chain = self.ancestors(target);
        for node in chain.by_ref() {
            visited += 1;
            match group {
                FieldGroup::BaseStats => {
                    if let Some(stats) = node.first_child("statBases") {
                        self.collect_stats(stats, &mut seen, &mut fields, str::to_string);
                    }
                }
                FieldGroup::StuffFactors => {
                    if let Some(factors) = stuff_group(node, "statFactors") {
                        self.collect_stats(factors, &mut seen, &mut fields, |v| format!("x{}", v));
                    }
                }
                FieldGroup::StuffOffsets => {
                    if let Some(offsets) = stuff_group(node, "statOffsets") {
                        self.collect_stats(offsets, &mut seen, &mut fields, signed);
                    }
                }
                FieldGroup::StuffGeneral => {
                    if let Some(props) = node.first_child("stuffProps") {
                        collect_general(props, &mut seen, &mut fields, &mut color);
                    }
                }
            }
        }

        FieldView {
            group,
            fields,
            color,
            chain_end: chain.end().cloned().unwrap_or(ChainEnd::Root),
            visited,
        }
    }

    /// Returns the text of the first match of `sub_path` on `target` or its
    /// nearest ancestor that has one, or `default` if none does.
    ///
    /// # Errors
    ///
    /// Returns a `QueryError` if `sub_path` is not a valid expression.
    pub fn lookup(&self, target: &'a Node, sub_path: &str, default: &str) -> Result<String, QueryError> {
        self.lookup_opt(target, sub_path)
            .map(|found| found.unwrap_or_else(|| default.to_string()))
    }

    /// Like [`lookup`](Self::lookup) without a default.
    pub fn lookup_opt(&self, target: &'a Node, sub_path: &str) -> Result<Option<String>, QueryError> {
        let path = Parser::parse(sub_path)?;
        for node in self.ancestors(target) {
            if let Some(found) = self.engine.evaluate_path_at(node, &path)?.first() {
                return Ok(Some(found.text()));
            }
        }
        Ok(None)
    }

    /// Display label for a stat: the `StatDef`'s label, else the stat name,
    /// capitalized either way.
    pub fn stat_label(&self, stat: &str) -> String {
        let label = self
            .snapshot
            .resolve_by_def_name(STAT_DEF_TAG, stat)
            .and_then(|def| def.child_text("label"));
        capitalize_first(label.as_deref().unwrap_or(stat))
    }

    fn collect_stats<F>(&self, group: &Node, seen: &mut HashSet<String>, fields: &mut Vec<Field>, format: F)
    where
        F: Fn(&str) -> String,
    {
        for stat in group.child_elements() {
            let Some(key) = stat.tag() else { continue };
            if !seen.insert(key.to_string()) {
                continue;
            }
            fields.push(Field {
                key: key.to_string(),
                label: self.stat_label(key),
                value: format(&stat.text()),
            });
        }
    }
}

fn stuff_group<'n>(node: &'n Node, name: &str) -> Option<&'n Node> {
    node.first_child("stuffProps")?.first_child(name)
}

fn collect_general(
    props: &Node,
    seen: &mut HashSet<String>,
    fields: &mut Vec<Field>,
    color: &mut Option<DisplayColor>,
) {
    for field in props.child_elements() {
        let Some(key) = field.tag() else { continue };
        if matches!(key, "statFactors" | "statOffsets") || seen.contains(key) {
            continue;
        }

        let text = field.text();
        if key == "color" {
            match ParsedColor::parse(&text) {
                Some(parsed) => *color = Some(parsed.to_rgb()),
                None => warn!(value = %text, "unparseable stuff color"),
            }
            fields.push(Field {
                key: key.to_string(),
                label: "Color".to_string(),
                value: text,
            });
            seen.insert(key.to_string());
        } else if field.has_only_text_children() && !text.is_empty() {
            fields.push(Field {
                key: key.to_string(),
                label: readable_field_name(key),
                value: text,
            });
            seen.insert(key.to_string());
        }
    }
}
