//! mysql-watcher - point-in-time MySQL health report.
//!
//! This is the main entry point that resolves configuration, initializes
//! logging and either runs a subcommand or writes one report.

mod cli;
mod commands;
mod config;

use std::fs::File;
use std::io::{self, BufWriter, Write};

use clap::Parser;
use tracing::{error, info, Level};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config};
use config::{resolve_config, show_config, validate_effective_config, Config};
use herakles_mysql_watcher::{generate_report, MySqlSession, ProcHost, ReportError};

/// Initializes tracing logging subsystem with configured log level.
///
/// Logs go to stderr; stdout carries the report.
fn setup_logging(level: LogLevel) {
    let log_level = match level {
        LogLevel::Off => None,
        LogLevel::Error => Some(Level::ERROR),
        LogLevel::Warn => Some(Level::WARN),
        LogLevel::Info => Some(Level::INFO),
        LogLevel::Debug => Some(Level::DEBUG),
        LogLevel::Trace => Some(Level::TRACE),
    };
    let Some(log_level) = log_level else {
        return;
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {:?}", level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> anyhow::Result<Config> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {:#}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Connects, writes one report and closes the connection.
async fn run_report(config: &Config) -> Result<(), ReportError> {
    let options = config.report_options();
    let mut session = MySqlSession::connect(&config.connect_params()).await?;

    let mut sink: Box<dyn Write> = match &config.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = generate_report(&mut session, &ProcHost::default(), &options, &mut sink).await?;
    sink.flush()?;
    info!(
        "Wrote {} sections ({} skipped)",
        summary.written, summary.skipped
    );

    session.close().await
}

/// Main application entry point.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {:#}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        return match command {
            Commands::Config {
                output,
                format,
                commented,
            } => command_config(output.clone(), *format, *commented),

            Commands::Check => {
                let config = resolve_config(&args)?;
                setup_logging(config.log_level(args.log_level));
                command_check(&config).await
            }
        };
    }

    let config = load_validated_config(&args)?;
    setup_logging(config.log_level(args.log_level));

    info!("Starting mysql-watcher {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_report(&config).await {
        error!("Report failed: {}", e);
        eprintln!("❌ Report failed: {}", e);
        std::process::exit(1);
    }

    if let Some(path) = &config.output {
        println!("✅ Report written to: {}", path.display());
    }

    Ok(())
}
