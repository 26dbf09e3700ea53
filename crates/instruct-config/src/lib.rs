//! Configuration management for the instruct system.
//!
//! This crate discovers the `.instruct/` project directory, loads
//! `.instruct/config.yaml` layered with `INSTRUCT_*` environment variables,
//! and saves configuration back to disk.

pub mod config;
pub mod instruct_dir;
