//! Report renderers.
//!
//! A renderer turns [`ReportSection`]s into bytes on a sink. Both formats
//! share the same contract: the section is validated before anything is
//! written, so an arity defect never leaves a half-drawn table behind, and
//! identical input always yields identical output.

mod html;
mod text;

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::table::ReportSection;

pub use html::HtmlRenderer;
pub use text::{TextRenderer, LINE_SIZE};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Html,
}

impl OutputFormat {
    pub fn renderer(&self) -> Box<dyn TableRenderer> {
        match self {
            OutputFormat::Txt => Box::new(TextRenderer),
            OutputFormat::Html => Box::new(HtmlRenderer),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Html => "html",
        }
    }
}

/// Static text printed at the top of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    pub name: String,
    pub version: String,
    pub build_timestamp: Option<String>,
    pub generated_at: String,
}

impl ReportHeader {
    /// Header for this build, stamped with the current local time.
    pub fn current() -> Self {
        Self {
            name: "MySQL Watcher".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            build_timestamp: option_env!("VERGEN_BUILD_TIMESTAMP").map(str::to_string),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    fn banner_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{} V{}", self.name, self.version)];
        if let Some(ts) = &self.build_timestamp {
            lines.push(format!("Build {}", ts));
        }
        lines.push(format!("Generated {}", self.generated_at));
        lines
    }
}

/// Writes report sections in one output format.
pub trait TableRenderer {
    /// Writes the report preamble.
    fn begin_report(&self, header: &ReportHeader, out: &mut dyn Write) -> Result<(), ReportError>;

    /// Validates `section`, then writes and flushes it.
    fn render(&self, section: &ReportSection, out: &mut dyn Write) -> Result<(), ReportError> {
        section.validate()?;
        self.write_section(section, out)?;
        out.flush()?;
        Ok(())
    }

    /// Writes an already validated section.
    fn write_section(&self, section: &ReportSection, out: &mut dyn Write) -> Result<(), ReportError>;

    /// Writes the end-of-report marker.
    fn end_report(&self, out: &mut dyn Write) -> Result<(), ReportError>;
}
