//! Text rendering for query results and item reports.
//!
//! Output is meant to be skimmed in a terminal or chat message: long XML
//! fragments are cut down to a fixed character budget while keeping both ends,
//! and field names are turned into readable labels.

pub mod report;
pub mod summary;

pub use report::render_report;
pub use summary::{summarize, SummaryOptions};

/// Default character budget for one rendered match.
pub const DEFAULT_SUMMARY_CHARS: usize = 100;

/// Shortens `s` to at most `limit` characters, keeping its start and end.
///
/// Strings of `limit` characters or fewer are returned unchanged. Longer ones
/// keep `limit / 2 - 2` leading and `round(limit / 2.0) - 3` trailing
/// characters joined by `" ... "`.
///
/// ```
/// use defquill::format::truncate;
///
/// assert_eq!(truncate("short", 100), "short");
/// let long = "a".repeat(60) + &"b".repeat(60);
/// let cut = truncate(&long, 100);
/// assert_eq!(cut, "a".repeat(48) + " ... " + &"b".repeat(47));
/// ```
pub fn truncate(s: &str, limit: usize) -> String {
    let length = s.chars().count();
    if length <= limit {
        return s.to_string();
    }

    let prefix_len = (limit / 2).saturating_sub(2);
    let suffix_len = ((limit as f64 / 2.0).round() as usize).saturating_sub(3);

    let prefix: String = s.chars().take(prefix_len).collect();
    let suffix: String = s.chars().skip(length - suffix_len.min(length)).collect();
    format!("{} ... {}", prefix, suffix)
}

/// Upper-cases the first character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turns a camelCase field name into a readable phrase.
///
/// The first letter is upper-cased; every later upper-case letter becomes a
/// space followed by its lower-case form.
///
/// ```
/// use defquill::format::readable_field_name;
///
/// assert_eq!(readable_field_name("commonality"), "Commonality");
/// assert_eq!(readable_field_name("constructEffect"), "Construct effect");
/// assert_eq!(readable_field_name("allowColorGenerators"), "Allow color generators");
/// ```
pub fn readable_field_name(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut out: String = first.to_uppercase().collect();
    for ch in chars {
        if ch.is_uppercase() {
            out.push(' ');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Renders a numeric string with an explicit sign; zero counts as positive.
///
/// Values that do not parse as numbers are returned unchanged.
///
/// ```
/// use defquill::format::signed;
///
/// assert_eq!(signed("3"), "+3");
/// assert_eq!(signed("-2"), "-2");
/// assert_eq!(signed("0"), "+0");
/// assert_eq!(signed("0.25"), "+0.25");
/// assert_eq!(signed("lots"), "lots");
/// ```
pub fn signed(value: &str) -> String {
    match value.trim().parse::<f64>() {
        Ok(number) if number == 0.0 => "+0".to_string(),
        Ok(number) if number > 0.0 => format!("+{}", number),
        Ok(number) => number.to_string(),
        Err(_) => value.to_string(),
    }
}
