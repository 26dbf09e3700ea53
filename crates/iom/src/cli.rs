//! Clap CLI definitions for the `iom` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// iom -- compile decision tables and run facts through them.
#[derive(Parser, Debug)]
#[command(
    name = "iom",
    about = "Decision-table compiler and rule engine",
    long_about = "Compiles spreadsheet decision tables into ordered rules and evaluates JSON facts against them.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory holding decision-table sheets (default: from config).
    #[arg(long, global = true)]
    pub rules_dir: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a sheet and print its rules.
    Compile(CompileArgs),

    /// Evaluate a fact against one or more sheets.
    Decide(DecideArgs),

    /// List the sheets in the rules directory.
    Sheets,

    /// Show configuration.
    Config(ConfigArgs),

    /// Generate shell completions.
    Completion(CompletionArgs),

    /// Print version information.
    Version,
}

/// Arguments for `iom compile`.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Sheet path, or a sheet name in the rules directory.
    pub sheet: String,
}

/// Arguments for `iom decide`.
#[derive(Args, Debug)]
pub struct DecideArgs {
    /// Sheet to load (repeatable; default: every sheet in the rules directory).
    #[arg(long = "sheet", short = 's')]
    pub sheets: Vec<String>,

    /// The fact: inline JSON, `@FILE`, or `-` for stdin.
    #[arg(long, short = 'f', default_value = "-")]
    pub fact: String,
}

/// Arguments for `iom config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration.
    Show,
    /// Print the path of the config file.
    Path,
}

/// Arguments for `iom completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

/// Supported shells.
#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    Bash,
    Zsh,
    Fish,
    Powershell,
}
