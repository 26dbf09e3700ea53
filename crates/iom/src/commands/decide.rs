//! `iom decide` -- run a fact through one or more sheets.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use instruct_table::{find_sheet, list_sheets};
use instruct_ui::styles::render_warn;
use serde_json::Value;
use tracing::debug;

use crate::cli::DecideArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `iom decide` command.
pub fn run(ctx: &RuntimeContext, args: &DecideArgs) -> Result<()> {
    let paths = resolve_sheets(ctx, &args.sheets)?;
    let book = ctx.rule_book();
    for path in &paths {
        book.load_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
    }
    debug!(sheets = paths.len(), rules = book.rule_count(), "rule book ready");

    let fact = read_fact(&args.fact)?;
    let decision = book.decide_value(fact)?;

    output_json(&decision);
    if !ctx.quiet && !ctx.json && decision.rules_executed.is_empty() {
        eprintln!("{}", render_warn("no rule matched"));
    }
    Ok(())
}

fn resolve_sheets(ctx: &RuntimeContext, names: &[String]) -> Result<Vec<PathBuf>> {
    if !names.is_empty() {
        return names
            .iter()
            .map(|name| find_sheet(name, ctx.rules_dir()).map_err(anyhow::Error::from))
            .collect();
    }
    let paths = list_sheets(ctx.rules_dir())?;
    if paths.is_empty() {
        bail!("no sheets found in {}", ctx.rules_dir().display());
    }
    Ok(paths)
}

/// Reads the fact argument: `-` is stdin, `@path` is a file, anything else
/// is inline JSON.
fn read_fact(arg: &str) -> Result<Value> {
    let text = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read fact from stdin")?;
        buf
    } else if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("failed to read fact file {}", path))?
    } else {
        arg.to_string()
    };
    serde_json::from_str(&text).context("fact is not valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn inline_fact() {
        assert_eq!(
            read_fact(r#"{"amount": 150}"#).unwrap(),
            json!({"amount": 150})
        );
    }

    #[test]
    fn fact_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fact.json");
        std::fs::write(&path, r#"{"country": "US"}"#).unwrap();
        let arg = format!("@{}", path.display());
        assert_eq!(read_fact(&arg).unwrap(), json!({"country": "US"}));
    }

    #[test]
    fn invalid_fact_is_an_error() {
        let err = read_fact("{amount").unwrap_err();
        assert!(format!("{:#}", err).contains("not valid JSON"));
    }
}
