//! `iom sheets` -- list the sheets in the rules directory.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use instruct_table::{ErrorKind, SheetFormat, list_sheets, sheet_id};
use instruct_ui::styles::{ICON_FAIL, ICON_PASS, render_error_kind, render_fail, render_pass};
use serde::Serialize;

use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

#[derive(Serialize)]
struct SheetEntry {
    id: String,
    path: String,
    format: Option<SheetFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rules: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the `iom sheets` command.
///
/// Every sheet is compiled on its own so one broken table does not hide the
/// others.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let entries: Vec<SheetEntry> = list_sheets(ctx.rules_dir())?
        .into_iter()
        .map(|path| {
            let book = ctx.rule_book();
            let mut entry = SheetEntry {
                id: sheet_id(&path),
                path: path.display().to_string(),
                format: SheetFormat::from_path(&path).ok(),
                modified: None,
                rules: None,
                kind: None,
                error: None,
            };
            match book.load_file(&path) {
                Ok(sheet) => {
                    entry.modified = Some(sheet.modified);
                    entry.rules = Some(sheet.rules.len());
                }
                Err(e) => {
                    entry.kind = e.table_kind();
                    entry.error = Some(e.to_string());
                }
            }
            entry
        })
        .collect();

    if ctx.json {
        output_json(&entries);
        return Ok(());
    }

    if entries.is_empty() {
        if !ctx.quiet {
            println!("No sheets in {}", ctx.rules_dir().display());
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            let status = match (entry.rules, entry.kind) {
                (Some(n), _) => format!("{} {}", render_pass(ICON_PASS), n),
                (None, Some(kind)) => {
                    format!("{} {} error", render_fail(ICON_FAIL), render_error_kind(kind))
                }
                (None, None) => format!("{} error", render_fail(ICON_FAIL)),
            };
            vec![
                entry.id.clone(),
                entry.format.map(|f| f.to_string()).unwrap_or_default(),
                entry
                    .modified
                    .map(|m| m.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
                status,
            ]
        })
        .collect();
    output_table(&["SHEET", "FORMAT", "MODIFIED", "RULES"], &rows);
    Ok(())
}
