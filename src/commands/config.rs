//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> anyhow::Result<()> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from("mysql-watcher.yaml"));

    let mut content = render_config(&config, format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles MySQL Watcher Configuration
# ====================================
#
# Connection
# ----------
# database:
#   host: "127.0.0.1"          # MySQL host
#   port: 3306                 # MySQL port
#   user: "root"               # Needs PROCESS and SELECT on sys/performance_schema
#   password: null             # null = read MYSQL_PWD from the environment
#   db: "mysql"                # Schema inspected by the per-database sections
#
# Report
# ------
# interval: 10                 # Seconds between the two SHOW GLOBAL STATUS samples
# output_format: "txt"         # txt or html
# output: null                 # File to write; null = stdout
# overview_key_buffer: false   # Append MyISAM key buffer hit rates to the overview
#
# Logging
# -------
# log_level: "warn"            # off, error, warn, info, debug, trace (stderr)
#
# Sections
# --------
# Every section is ON unless listed here. Top-N sections take a row limit;
# ON means 10.
# sections:
#   linux_info: ON
#   filesystem_info: ON
#   linux_overview: ON
#   host_memory_topN: 10
#   mysql_overview: ON
#   sys_parm: ON
#   log_error_statistics: OFF
#   slow_query_topN: 20
#   metrics: OFF
#
# Custom sections
# ---------------
# custom_sections:
#   - title: "Accounts"
#     query: "SELECT user, host FROM mysql.user"
#     styles: ["user,l", "host,l"]   # label,align or label,width,align
"#;

    format!("{comments}\n{yaml}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commented_config_still_parses() {
        let yaml = render_config(&Config::default(), ConfigFormat::Yaml).unwrap();
        let commented = add_config_comments(yaml);
        assert!(commented.starts_with("# Herakles MySQL Watcher Configuration"));
        let cfg: Config = serde_yaml::from_str(&commented).unwrap();
        assert_eq!(cfg.database.port, Some(3306));
    }

    #[test]
    fn test_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watcher.json");
        command_config(Some(path.clone()), ConfigFormat::Json, false).unwrap();
        let content = fs::read_to_string(path).unwrap();
        let cfg: Config = serde_json::from_str(&content).unwrap();
        assert_eq!(cfg.interval, Some(10));
    }
}
