//! Terminal styling for the instruct CLI.
//!
//! Provides Ayu-themed colour helpers and terminal detection. Every helper
//! falls back to plain text when colour is not supported.

pub mod styles;
pub mod terminal;
