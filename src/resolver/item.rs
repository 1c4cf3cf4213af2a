//! Item lookup by name and the per-item report built from it.
//!
//! A lookup runs three searches over `ThingDef`s (exact defName, exact label,
//! label substring; all case-insensitive on the defName/label side) and merges
//! them without duplicates. The first hit gets a full report with inherited
//! stats; the remaining hits are offered as alternatives.

use super::inherit::{DisplayColor, FieldGroup, FieldView, InheritanceResolver};
use crate::document::node::Node;
use crate::format::capitalize_first;
use crate::xpath::{dedup_matches, Match, QueryError};
use serde::Serialize;
use tracing::debug;

const THING_DEF_PATH: &str = "Defs/ThingDef";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";

/// Errors from item lookups.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Invalid name! Only letters, numbers, spaces, underscores or dashes allowed.")]
    InvalidName(String),
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Checks that an item name only uses letters, digits, spaces, `_` and `-`.
///
/// ```
/// use defquill::resolver::validate_item_name;
///
/// assert!(validate_item_name("Steel").is_ok());
/// assert!(validate_item_name("wood log_2-b").is_ok());
/// assert!(validate_item_name("x\"]|//*").is_err());
/// assert!(validate_item_name("").is_err());
/// ```
pub fn validate_item_name(name: &str) -> Result<(), LookupError> {
    let allowed = |ch: char| ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '_' | '-');
    if name.trim().is_empty() || !name.chars().all(allowed) {
        return Err(LookupError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Stats shown for definitions in the `Item` category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemStats {
    pub stack_limit: String,
    pub always_haulable: String,
    /// Only reported for materials (definitions with `stuffProps`)
    pub small_volume: Option<String>,
}

/// Material properties of a definition that has `stuffProps`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StuffReport {
    pub general: FieldView,
    pub factors: FieldView,
    pub offsets: FieldView,
}

impl StuffReport {
    pub fn color(&self) -> Option<DisplayColor> {
        self.general.color
    }
}

/// Everything shown for one looked-up item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    /// Capitalized label, or the defName if there is none
    pub title: String,
    pub def_name: Option<String>,
    pub description: String,
    pub item_stats: Option<ItemStats>,
    pub base_stats: FieldView,
    pub stuff: Option<StuffReport>,
    /// defNames of the other matches
    pub did_you_mean: Vec<String>,
}

impl ItemReport {
    /// Names of missing parents met while resolving any section.
    pub fn dangling_parents(&self) -> Vec<&str> {
        let mut views = vec![&self.base_stats];
        if let Some(stuff) = &self.stuff {
            views.extend([&stuff.general, &stuff.factors, &stuff.offsets]);
        }
        let mut names: Vec<&str> = views.into_iter().filter_map(FieldView::dangling_parent).collect();
        names.dedup();
        names
    }
}

/// Finds items by user-supplied name and builds reports for them.
pub struct ItemLookup<'a> {
    resolver: InheritanceResolver<'a>,
}

impl<'a> ItemLookup<'a> {
    pub fn new(resolver: InheritanceResolver<'a>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &InheritanceResolver<'a> {
        &self.resolver
    }

    /// Returns every `ThingDef` matching `name`, best matches first.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::InvalidName` for names outside the allowed
    /// character set.
    pub fn search(&self, name: &str) -> Result<Vec<Match<'a>>, LookupError> {
        validate_item_name(name)?;
        let needle = name.to_lowercase();
        let engine = self.resolver.engine();

        let by_def_name = engine.evaluate(&format!(
            "{}[translate(defName,'{}','{}')=\"{}\"]",
            THING_DEF_PATH, UPPERCASE, LOWERCASE, needle
        ))?;
        let by_label = engine.evaluate(&format!(
            "{}[translate(label,'{}','{}')=\"{}\"]",
            THING_DEF_PATH, UPPERCASE, LOWERCASE, needle
        ))?;
        let by_substring = engine.evaluate(&format!(
            "{}[contains(label, \"{}\")]",
            THING_DEF_PATH, needle
        ))?;

        let matches = dedup_matches(by_def_name.into_iter().chain(by_label).chain(by_substring));
        debug!(name, matches = matches.len(), "item search");
        Ok(matches)
    }

    /// Builds the report for the best match of `name`, or `None` if nothing
    /// matches.
    pub fn report(&self, name: &str) -> Result<Option<ItemReport>, LookupError> {
        let matches = self.search(name)?;
        let Some((first, rest)) = matches.split_first() else {
            return Ok(None);
        };

        let mut report = self.report_for(first.node)?;
        report.did_you_mean = rest
            .iter()
            .filter_map(|m| m.node.child_text("defName"))
            .collect();
        Ok(Some(report))
    }

    /// Builds the report for one definition.
    pub fn report_for(&self, def: &'a Node) -> Result<ItemReport, LookupError> {
        let resolver = &self.resolver;
        let def_name = def.child_text("defName");
        let label = def.child_text("label");
        let has_stuff = def.first_child("stuffProps").is_some();

        let item_stats = if resolver.lookup_opt(def, "category")?.as_deref() == Some("Item") {
            Some(ItemStats {
                stack_limit: resolver.lookup(def, "stackLimit", "1")?,
                always_haulable: resolver.lookup(def, "alwaysHaulable", "false")?,
                small_volume: if has_stuff {
                    Some(resolver.lookup(def, "smallVolume", "false")?)
                } else {
                    None
                },
            })
        } else {
            None
        };

        let stuff = has_stuff.then(|| StuffReport {
            general: resolver.resolve(def, FieldGroup::StuffGeneral),
            factors: resolver.resolve(def, FieldGroup::StuffFactors),
            offsets: resolver.resolve(def, FieldGroup::StuffOffsets),
        });

        Ok(ItemReport {
            title: capitalize_first(label.as_deref().or(def_name.as_deref()).unwrap_or_default()),
            description: def
                .child_text("description")
                .unwrap_or_else(|| "No description.".to_string()),
            def_name,
            item_stats,
            base_stats: resolver.resolve(def, FieldGroup::BaseStats),
            stuff,
            did_you_mean: Vec::new(),
        })
    }
}
