//! CLI command implementations for mysql-watcher.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: Server connectivity and capability check
//! - `config`: Configuration file generation

pub mod check;
pub mod config;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
