//! `iom` -- decision-table compiler and rule engine CLI.
//!
//! Parses CLI arguments with clap, resolves the runtime context, and
//! dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::RuntimeContext;

const VERBOSE_FILTER: &str = "iom=debug,instruct_table=debug,instruct_engine=debug";

fn main() {
    let cli = Cli::parse();

    // -v forces debug output; otherwise RUST_LOG decides, defaulting to warnings.
    let filter = if cli.global.verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = match RuntimeContext::from_global_args(&cli.global) {
        Ok(ctx) => ctx,
        Err(e) => exit_with_error(&e, cli.global.json),
    };

    let result = match cli.command {
        Some(Commands::Compile(args)) => commands::compile::run(&ctx, &args),
        Some(Commands::Decide(args)) => commands::decide::run(&ctx, &args),
        Some(Commands::Sheets) => commands::sheets::run(&ctx),
        Some(Commands::Config(args)) => commands::config_cmd::run(&ctx, &args),
        Some(Commands::Completion(args)) => commands::completion::run(&ctx, &args),
        Some(Commands::Version) => commands::version::run(&ctx),
        None => {
            let _ = Cli::command().print_help();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        exit_with_error(&e, ctx.json);
    }
}

fn exit_with_error(e: &anyhow::Error, json: bool) -> ! {
    if json {
        let err_json = serde_json::json!({ "error": format!("{:#}", e) });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&err_json).unwrap_or_default()
        );
    } else {
        eprintln!("Error: {:#}", e);
    }
    std::process::exit(1);
}
