//! Core types for the instruct decision-table system.
//!
//! This crate holds everything the table compiler and the rule engine share:
//! fact values and their comparison rules, the small expression language that
//! binding templates are written in, the session calling convention, and the
//! compiled rule / rule set types.

pub mod content_hash;
pub mod expr;
pub mod rule;
pub mod session;
pub mod value;

pub use expr::{EvalError, ExprError};
pub use rule::{CompiledRule, Condition, Consequence, FragmentError, Rule, RuleSet};
pub use session::Session;
pub use value::Fact;
