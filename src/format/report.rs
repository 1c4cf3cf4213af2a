//! Plain-text rendering of item reports.

use crate::resolver::{FieldView, ItemReport};
use std::fmt::Write;

/// Renders a report as titled sections. Empty sections are left out.
pub fn render_report(report: &ItemReport) -> String {
    let mut out = String::new();

    let _ = match &report.def_name {
        Some(def_name) => writeln!(out, "Info for item \"{}\" (defName: {})", report.title, def_name),
        None => writeln!(out, "Info for item \"{}\"", report.title),
    };
    let _ = writeln!(out, "{}", report.description);

    if let Some(stats) = &report.item_stats {
        let mut lines = vec![
            format!("Stack limit: {}", stats.stack_limit),
            format!("Automatically haulable: {}", stats.always_haulable),
        ];
        if let Some(small_volume) = &stats.small_volume {
            lines.push(format!("Small volume: {}", small_volume));
        }
        section(&mut out, "Item stats", &lines);
    }

    view_section(&mut out, "Base stats", &report.base_stats);

    if let Some(stuff) = &report.stuff {
        view_section(&mut out, "Stuff properties - General", &stuff.general);
        if let Some(color) = stuff.color() {
            let _ = writeln!(out, "Display color: {}", color.hex());
        }
        view_section(&mut out, "Stat modifiers - Factors", &stuff.factors);
        view_section(&mut out, "Stat modifiers - Offsets", &stuff.offsets);
    }

    for parent in report.dangling_parents() {
        let _ = writeln!(out, "\nWarning: parent definition \"{}\" not found", parent);
    }

    if !report.did_you_mean.is_empty() {
        let names: Vec<String> = report
            .did_you_mean
            .iter()
            .map(|name| format!("`{}`", name))
            .collect();
        section(&mut out, "Did you mean", &[names.join(", ")]);
    }

    out
}

fn view_section(out: &mut String, title: &str, view: &FieldView) {
    section(out, title, &view.lines());
}

fn section(out: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}", title);
    for line in lines {
        let _ = writeln!(out, "  {}", line);
    }
}
