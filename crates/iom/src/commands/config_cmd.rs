//! `iom config` -- inspect the effective configuration.

use anyhow::{Context, Result};

use crate::cli::{ConfigArgs, ConfigCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `iom config` command.
pub fn run(ctx: &RuntimeContext, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommands::Show => {
            if ctx.json {
                output_json(&ctx.config);
            } else {
                let yaml = serde_yaml::to_string(&ctx.config)
                    .context("failed to render configuration")?;
                print!("{}", yaml);
                if !ctx.quiet {
                    println!("# rules directory: {}", ctx.rules_dir().display());
                }
            }
        }

        ConfigCommands::Path => {
            let path = ctx.config_path()?;
            if ctx.json {
                output_json(&serde_json::json!({
                    "path": path,
                    "exists": path.is_file(),
                }));
            } else {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
