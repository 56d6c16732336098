//! Configuration management for mysql-watcher.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use anyhow::{bail, Context};
use herakles_mysql_watcher::report::known_section_keys;
use herakles_mysql_watcher::{
    ConnectParams, CustomSection, OutputFormat, ReportOptions, SectionToggle,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_DB: &str = "mysql";
pub const DEFAULT_INTERVAL: u64 = 10;

/// Environment variable read for the password when the config has none.
pub const PASSWORD_ENV: &str = "MYSQL_PWD";

/// Connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Schema inspected by the per-database sections
    pub db: Option<String>,
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Plain values stay ahead of the nested tables; TOML output needs that order.
    /// Seconds between the two status snapshots
    pub interval: Option<u64>,
    pub output_format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    // Logging
    pub log_level: Option<String>,

    /// Append the MyISAM key buffer hit rates to the overview
    #[serde(alias = "overview-key-buffer")]
    pub overview_key_buffer: Option<bool>,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Section toggles: ON, OFF or a top-N row limit
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sections: BTreeMap<String, SectionToggle>,

    #[serde(
        default,
        alias = "custom-sections",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub custom_sections: Vec<CustomSection>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                host: Some(DEFAULT_HOST.to_string()),
                port: Some(DEFAULT_PORT),
                user: Some(DEFAULT_USER.to_string()),
                password: None,
                db: Some(DEFAULT_DB.to_string()),
            },
            interval: Some(DEFAULT_INTERVAL),
            output_format: Some(OutputFormat::Txt),
            output: None,
            log_level: Some("warn".into()),
            overview_key_buffer: Some(false),
            sections: BTreeMap::new(),
            custom_sections: Vec::new(),
        }
    }
}

impl Config {
    pub fn connect_params(&self) -> ConnectParams {
        let password = self
            .database
            .password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV).ok())
            .unwrap_or_default();
        ConnectParams {
            host: self.host().to_string(),
            port: self.database.port.unwrap_or(DEFAULT_PORT),
            user: self.user().to_string(),
            password,
            database: self.db().to_string(),
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            host: self.host().to_string(),
            user: self.user().to_string(),
            database: self.db().to_string(),
            interval_seconds: self.interval.unwrap_or(DEFAULT_INTERVAL),
            format: self.output_format.unwrap_or_default(),
            sections: self.sections.clone(),
            custom_sections: self.custom_sections.clone(),
            overview_key_buffer: self.overview_key_buffer.unwrap_or(false),
        }
    }

    /// Effective log level; CLI wins over the file.
    pub fn log_level(&self, cli: Option<LogLevel>) -> LogLevel {
        if let Some(level) = cli {
            return level;
        }
        match self.log_level.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("off") => LogLevel::Off,
            Some("error") => LogLevel::Error,
            Some("info") => LogLevel::Info,
            Some("debug") => LogLevel::Debug,
            Some("trace") => LogLevel::Trace,
            _ => LogLevel::Warn,
        }
    }

    fn host(&self) -> &str {
        self.database.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    fn user(&self) -> &str {
        self.database.user.as_deref().unwrap_or(DEFAULT_USER)
    }

    fn db(&self) -> &str {
        self.database.db.as_deref().unwrap_or(DEFAULT_DB)
    }
}

/// Validate effective config (used by --check-config and before a run)
pub fn validate_effective_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.interval == Some(0) {
        bail!("interval must be greater than 0 seconds");
    }

    if cfg.database.host.as_deref().is_some_and(|h| h.trim().is_empty()) {
        bail!("database.host must not be empty");
    }

    if let Some(level) = cfg.log_level.as_deref() {
        let known = ["off", "error", "warn", "info", "debug", "trace"];
        if !known.contains(&level.to_ascii_lowercase().as_str()) {
            bail!("Invalid log_level '{}', expected one of {}", level, known.join(", "));
        }
    }

    let known = known_section_keys();
    for name in cfg.sections.keys() {
        if !known.contains(&name.as_str()) {
            bail!("Unknown section '{}' in sections", name);
        }
    }

    for custom in &cfg.custom_sections {
        if custom.title.trim().is_empty() {
            bail!("custom_sections entry with empty title");
        }
        if custom.query.trim().is_empty() {
            bail!("custom section '{}' has an empty query", custom.title);
        }
        let styles = custom
            .column_styles()
            .with_context(|| format!("custom section '{}' has invalid styles", custom.title))?;
        if styles.is_empty() {
            bail!("custom section '{}' declares no columns", custom.title);
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(format) = args.format {
        config.output_format = Some(format);
    }
    if let Some(output) = &args.output {
        config.output = Some(output.clone());
    }
    if let Some(interval) = args.interval {
        config.interval = Some(interval);
    }
    if let Some(host) = &args.host {
        config.database.host = Some(host.clone());
    }
    if let Some(port) = args.port {
        config.database.port = Some(port);
    }
    if let Some(user) = &args.user {
        config.database.user = Some(user.clone());
    }
    if let Some(db) = &args.db {
        config.database.db = Some(db.clone());
    }

    Ok(config)
}

/// Default config locations, in search order.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "/etc/mysql-watcher/mysql-watcher.yaml",
    "/etc/mysql-watcher/mysql-watcher.yml",
    "/etc/mysql-watcher/mysql-watcher.json",
    "./mysql-watcher.yaml",
    "./mysql-watcher.yml",
    "./mysql-watcher.json",
];

/// Loads a config file. An explicit path must exist; without one the
/// default locations are tried and built-in defaults used if none exists.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                bail!("Config file not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => match DEFAULT_CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists()) {
            Some(p) => p.to_path_buf(),
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", path.display()))?,
        // Default to YAML
        _ => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?,
    };
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Renders configuration in the requested format
pub fn render_config(config: &Config, format: ConfigFormat) -> anyhow::Result<String> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> anyhow::Result<()> {
    println!("{}", render_config(config, format)?);
    Ok(())
}
