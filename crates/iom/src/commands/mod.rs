//! Command handlers, one module per subcommand.

pub mod compile;
pub mod completion;
pub mod config_cmd;
pub mod decide;
pub mod sheets;
pub mod version;
