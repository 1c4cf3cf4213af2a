//! Bounded rendering of raw query matches.

use super::{truncate, DEFAULT_SUMMARY_CHARS};
use crate::xpath::Match;
use std::fmt::Write;
use std::time::Duration;

/// Default number of matches rendered in full.
pub const DEFAULT_MAX_SHOWN: usize = 5;

/// Limits applied when summarizing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// How many matches are rendered
    pub max_shown: usize,
    /// Character budget per rendered match
    pub max_chars: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_shown: DEFAULT_MAX_SHOWN,
            max_chars: DEFAULT_SUMMARY_CHARS,
        }
    }
}

/// Renders up to `max_shown` matches as XML comments plus truncated markup,
/// followed by the total match count and evaluation time.
///
/// ```
/// use defquill::document::node::Element;
/// use defquill::format::{summarize, SummaryOptions};
/// use defquill::xpath::Match;
/// use std::time::Duration;
///
/// let node = Element::new("label").with_text("steel").into_node();
/// let matches = [Match { document_id: "Items.xml", node: &node }];
/// let text = summarize(&matches, Duration::from_millis(3), &SummaryOptions::default());
///
/// assert!(text.starts_with("<!-- In Items.xml: -->\n<label>steel</label>\n"));
/// assert!(text.contains("Found 1 results total"));
/// ```
pub fn summarize(matches: &[Match<'_>], elapsed: Duration, options: &SummaryOptions) -> String {
    let mut out = String::new();

    for m in matches.iter().take(options.max_shown) {
        let _ = writeln!(out, "<!-- In {}: -->", m.document_id);
        let _ = writeln!(out, "{}\n", truncate(&m.node.outer_xml(), options.max_chars));
    }

    let _ = writeln!(
        out,
        "<!-- Summary: Found {} results total (showing first {} if applicable) -->",
        matches.len(),
        options.max_shown
    );
    let _ = write!(
        out,
        "<!-- Evaluation time {}µs ({}ms) -->",
        elapsed.as_micros(),
        elapsed.as_millis()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::{Element, Node};

    #[test]
    fn test_summarize_limits_shown_matches() {
        let nodes: Vec<Node> = (0..7)
            .map(|i| Element::new("defName").with_text(format!("Def{}", i)).into_node())
            .collect();
        let matches: Vec<Match<'_>> = nodes
            .iter()
            .map(|node| Match {
                document_id: "Defs.xml",
                node,
            })
            .collect();

        let options = SummaryOptions {
            max_shown: 3,
            max_chars: 100,
        };
        let text = summarize(&matches, Duration::from_micros(1500), &options);

        assert_eq!(text.matches("<!-- In Defs.xml: -->").count(), 3);
        assert!(text.contains("<defName>Def2</defName>"));
        assert!(!text.contains("Def3"));
        assert!(text.contains("Found 7 results total (showing first 3 if applicable)"));
        assert!(text.ends_with("<!-- Evaluation time 1500µs (1ms) -->"));
    }

    #[test]
    fn test_summarize_truncates_long_markup() {
        let node = Element::new("description").with_text("x".repeat(300)).into_node();
        let matches = [Match {
            document_id: "a.xml",
            node: &node,
        }];
        let text = summarize(&matches, Duration::ZERO, &SummaryOptions::default());
        let body = text.lines().nth(1).unwrap();
        assert_eq!(body.chars().count(), 100);
        assert!(body.starts_with("<description>"));
        assert!(body.ends_with("</description>"));
    }

    #[test]
    fn test_summarize_empty() {
        let text = summarize(&[], Duration::ZERO, &SummaryOptions::default());
        assert!(text.starts_with("<!-- Summary: Found 0 results total"));
    }
}
