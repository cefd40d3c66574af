//! Command handlers: bridge CLI args -> core engine -> output formatting.

pub mod apply;
pub mod config_cmd;
pub mod show;
