//! CLI arguments and subcommands for mysql-watcher.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use herakles_mysql_watcher::OutputFormat;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "mysql-watcher",
    about = "Point-in-time MySQL health report as text or HTML",
    long_about = "Point-in-time MySQL health report as text or HTML.\n\n\
                  Samples the server's global status twice, derives throughput and \
                  efficiency ratios, and adds host, variable, sys schema and \
                  performance_schema diagnostics in one report.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version,
    propagate_version = true,
    after_help = "More info: https://www.herakles.now"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Report format
    #[arg(short = 's', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Seconds between the two status snapshots
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// MySQL host
    #[arg(long)]
    pub host: Option<String>,

    /// MySQL port
    #[arg(long)]
    pub port: Option<u16>,

    /// MySQL user
    #[arg(long)]
    pub user: Option<String>,

    /// Schema inspected by the per-database sections
    #[arg(long)]
    pub db: Option<String>,

    /// Log level (logs go to stderr)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to the server and report what the report can use
    Check,

    /// Generate configuration files
    Config {
        /// Output file path
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
