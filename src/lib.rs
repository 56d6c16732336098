//! Herakles MySQL Watcher Library
//!
//! Builds a point-in-time health report of a MySQL server: a two-sample
//! overview of global status counters, host information, curated variables
//! and a catalog of `sys` / `performance_schema` diagnostics, rendered as
//! plain text or HTML.
//!
//! # Usage
//!
//! ```no_run
//! use herakles_mysql_watcher::{generate_report, ConnectParams, MySqlSession, ProcHost, ReportOptions};
//! use herakles_mysql_watcher::OutputFormat;
//!
//! # async fn run() -> Result<(), herakles_mysql_watcher::ReportError> {
//! let params = ConnectParams {
//!     host: "127.0.0.1".into(),
//!     port: 3306,
//!     user: "monitor".into(),
//!     password: String::new(),
//!     database: "shop".into(),
//! };
//! let mut session = MySqlSession::connect(&params).await?;
//! let options = ReportOptions {
//!     host: params.host.clone(),
//!     user: params.user.clone(),
//!     database: params.database.clone(),
//!     interval_seconds: 10,
//!     format: OutputFormat::Txt,
//!     sections: Default::default(),
//!     custom_sections: Vec::new(),
//!     overview_key_buffer: false,
//! };
//! generate_report(&mut session, &ProcHost::default(), &options, &mut std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

pub mod duration;
pub mod error;
pub mod host;
pub mod overview;
pub mod render;
pub mod report;
pub mod sections;
pub mod session;
pub mod snapshot;
pub mod table;

// Re-export main types for convenience
pub use error::{MissingCounterError, ReportError};
pub use host::{HostInspector, ProcHost};
pub use render::{OutputFormat, TableRenderer};
pub use report::{generate_report, ReportOptions, ReportSummary, SectionToggle};
pub use sections::CustomSection;
pub use session::{ConnectParams, MySqlSession, ServerCapabilities, Session};
pub use table::{Cell, ColumnStyle, ColumnStyles, ReportSection};
