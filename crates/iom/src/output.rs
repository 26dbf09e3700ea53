//! Output formatting helpers for the `iom` CLI.
//!
//! JSON output, aligned tables, and the human-readable rule listing.

use std::io::{self, Write};

use instruct_core::CompiledRule;
use instruct_ui::styles::{ICON_ARROW, render_expression, render_muted, render_rule_name};
use serde::Serialize;

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print a simple table with headers and rows.
///
/// Column widths are computed from the data for alignment.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = write!(handle, "{}", format_table(headers, rows));
}

fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        match widths.get(i) {
            Some(width) if i < last => out.push_str(&format!("{:<width$}", cell, width = width)),
            _ => out.push_str(cell),
        }
    }
    out.push('\n');
}

/// Format a compiled rule as a multi-line block:
///
/// ```text
/// domestic
///   when 150 > 100 && 'US' === 'US'
///   → true
/// ```
pub fn format_rule(rule: &CompiledRule) -> String {
    let condition = if rule.condition.source.is_empty() {
        render_muted("(always)")
    } else {
        render_expression(&rule.condition.source)
    };
    let mut out = format!(
        "{}\n  {} {}\n",
        render_rule_name(&rule.name),
        render_muted("when"),
        condition
    );
    if rule.consequence.source.is_empty() {
        out.push_str(&format!("  {} {}\n", ICON_ARROW, render_muted("(nothing)")));
    }
    for line in rule.consequence.source.lines() {
        out.push_str(&format!("  {} {}\n", ICON_ARROW, render_expression(line)));
    }
    out
}
