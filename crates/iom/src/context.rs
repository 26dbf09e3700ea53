//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds what every command handler needs: the
//! discovered `.instruct/` directory, the effective configuration, the
//! resolved rules directory and the global output flags.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use instruct_config::config::{
    CONFIG_FILE_NAME, ConfigError, InstructConfig, load_config, load_default_config,
};
use instruct_config::instruct_dir::{find_instruct_dir, project_root};
use instruct_engine::RuleBook;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Discovered `.instruct/` directory, if any.
    pub instruct_dir: Option<PathBuf>,

    /// Effective configuration (defaults, config file, environment).
    pub config: InstructConfig,

    /// Directory sheets are looked up in.
    pub rules_dir: PathBuf,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    ///
    /// `--rules-dir` is taken relative to the working directory; the
    /// configured `rules-dir` is relative to the project root (the parent of
    /// `.instruct/`, or the working directory when there is none).
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let cwd = env::current_dir().context("cannot determine the working directory")?;
        let instruct_dir = find_instruct_dir(&cwd);

        let config = match &instruct_dir {
            Some(dir) => load_config(dir)
                .with_context(|| format!("failed to load {}", dir.join(CONFIG_FILE_NAME).display()))?,
            None => load_default_config().context("failed to load configuration")?,
        };

        let rules_dir = match &global.rules_dir {
            Some(dir) => dir.clone(),
            None => {
                let root = instruct_dir.as_deref().map(project_root).unwrap_or(cwd);
                config.rules_path(&root)
            }
        };

        Ok(Self {
            json: global.json || config.json,
            verbose: global.verbose,
            quiet: global.quiet,
            instruct_dir,
            config,
            rules_dir,
        })
    }

    /// Path of the config file, whether or not it exists.
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        self.instruct_dir
            .as_deref()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::InstructDirNotFound)
    }

    /// An empty rule book using the configured table syntax and engine
    /// settings.
    pub fn rule_book(&self) -> RuleBook {
        RuleBook::new(self.config.table.clone(), self.config.engine)
    }

    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }
}
