//! The engine capability interface.
//!
//! Callers own their rule sets and hand them to an engine explicitly; there
//! is no process-wide registry.

use instruct_core::{Fact, RuleSet};
use serde::Serialize;

use crate::error::Result;

/// The outcome of running a fact through an engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// The fact after every executed consequence.
    pub fact: Fact,
    /// Names of the rules whose condition held, in firing order.
    pub match_path: Vec<String>,
}

/// Anything that can run compiled rules against a fact.
pub trait RuleEngine: Send + Sync {
    /// Appends a rule set after the rules already registered.
    fn register(&mut self, rules: RuleSet);

    /// Runs the registered rules against `fact`.
    fn execute(&self, fact: Fact) -> Result<Execution>;
}
