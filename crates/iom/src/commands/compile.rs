//! `iom compile` -- compile a sheet and print its rules.

use anyhow::{Context, Result};
use instruct_core::RuleSet;
use instruct_table::{compile_sheet, find_sheet, sheet_id};
use instruct_ui::styles::{render_bold, render_separator};
use serde::Serialize;
use tracing::debug;

use crate::cli::CompileArgs;
use crate::context::RuntimeContext;
use crate::output::{format_rule, output_json};

#[derive(Serialize)]
struct CompiledSheet<'a> {
    sheet: String,
    path: String,
    etag: String,
    rules: &'a RuleSet,
}

/// Execute the `iom compile` command.
pub fn run(ctx: &RuntimeContext, args: &CompileArgs) -> Result<()> {
    let path = find_sheet(&args.sheet, ctx.rules_dir())?;
    debug!(path = %path.display(), "compiling sheet");

    let rules = compile_sheet(&path, &ctx.config.table)
        .with_context(|| format!("failed to compile {}", path.display()))?;

    if ctx.json {
        output_json(&CompiledSheet {
            sheet: sheet_id(&path),
            path: path.display().to_string(),
            etag: rules.content_hash(),
            rules: &rules,
        });
        return Ok(());
    }

    if !ctx.quiet {
        let heading = format!(
            "{}: {} rule{}",
            sheet_id(&path),
            rules.len(),
            if rules.len() == 1 { "" } else { "s" }
        );
        println!("{}\n{}", render_bold(&heading), render_separator());
    }
    for rule in &rules {
        println!("{}", format_rule(rule));
    }
    Ok(())
}
