//! Rule engine for the instruct system.
//!
//! Provides the [`RuleEngine`] capability trait, a forward-chaining
//! implementation ([`ForwardChainEngine`]), and the [`RuleBook`] that keeps
//! compiled sheets and swaps them in atomically.

pub mod error;
pub mod forward;
pub mod rulebook;
pub mod traits;

pub use error::EngineError;
pub use forward::{EngineSettings, ForwardChainEngine};
pub use rulebook::{Decision, RuleBook, Sheet};
pub use traits::{Execution, RuleEngine};
