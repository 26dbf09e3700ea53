//! Engine error types.

use instruct_core::EvalError;
use instruct_table::{ErrorKind, TableError};

/// Errors that can occur while loading sheets or executing rules.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A rule's condition or consequence failed against the fact.
    #[error("rule '{rule}' failed: {source}")]
    Eval {
        /// Name of the rule being run.
        rule: String,
        /// The evaluation failure.
        source: EvalError,
    },

    /// Consequences kept restarting execution.
    #[error("execution restarted more than {limit} times")]
    RestartLimit {
        /// The configured maximum.
        limit: u32,
    },

    /// A sheet failed to decode or compile.
    #[error(transparent)]
    Table(#[from] TableError),

    /// The fact is not a JSON object.
    #[error("fact must be a JSON object, got {found}")]
    InvalidFact {
        /// JSON type of the rejected value.
        found: &'static str,
    },
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    // -- Constructors --------------------------------------------------------

    /// Creates an [`EngineError::Eval`] for the named rule.
    pub fn eval(rule: impl Into<String>, source: EvalError) -> Self {
        Self::Eval {
            rule: rule.into(),
            source,
        }
    }

    // -- Predicates ----------------------------------------------------------

    /// The table error classification, for sheet failures.
    pub fn table_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Table(e) => Some(e.kind()),
            _ => None,
        }
    }
}
