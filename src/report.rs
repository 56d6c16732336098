//! Report assembly: decides which sections run, in which order, and streams
//! each one to the sink as soon as it is built.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::error::ReportError;
use crate::host::HostInspector;
use crate::overview;
use crate::render::{OutputFormat, ReportHeader, TableRenderer};
use crate::sections::{self, SectionKind, DEFAULT_TOP_N};
use crate::session::{ServerCapabilities, Session};
use crate::snapshot::{take_snapshot, SampleSeq};
use crate::table::{Cell, ColumnStyles, ReportSection};

pub const BASIC_INFORMATION_TITLE: &str = "Basic Information";

/// Sections that are not part of the pass-through catalog, with their kind.
pub const BUILTIN_SECTIONS: &[(&str, SectionKind)] = &[
    ("linux_info", SectionKind::Toggle),
    ("filesystem_info", SectionKind::Toggle),
    ("linux_overview", SectionKind::Toggle),
    ("host_memory_topN", SectionKind::TopN),
    ("mysql_overview", SectionKind::Toggle),
    ("sys_parm", SectionKind::Toggle),
    ("log_error_statistics", SectionKind::Toggle),
];

/// Every section name accepted in the `sections` configuration map.
pub fn known_section_keys() -> Vec<&'static str> {
    BUILTIN_SECTIONS
        .iter()
        .map(|(key, _)| *key)
        .chain(sections::catalog_keys())
        .collect()
}

/// Per-section switch from configuration: `ON`, `OFF` or a row limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionToggle {
    #[default]
    On,
    Off,
    TopN(usize),
}

impl SectionToggle {
    pub fn is_on(&self) -> bool {
        !matches!(self, SectionToggle::Off | SectionToggle::TopN(0))
    }

    /// Row limit for top-N sections; `ON` means [`DEFAULT_TOP_N`].
    pub fn limit(&self) -> usize {
        match self {
            SectionToggle::TopN(n) => *n,
            _ => DEFAULT_TOP_N,
        }
    }
}

impl fmt::Display for SectionToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionToggle::On => f.write_str("ON"),
            SectionToggle::Off => f.write_str("OFF"),
            SectionToggle::TopN(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for SectionToggle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("on") || s.eq_ignore_ascii_case("true") {
            return Ok(SectionToggle::On);
        }
        if s.eq_ignore_ascii_case("off") || s.eq_ignore_ascii_case("false") {
            return Ok(SectionToggle::Off);
        }
        s.parse::<usize>()
            .map(SectionToggle::TopN)
            .map_err(|_| format!("invalid section toggle '{}': expected ON, OFF or a number", s))
    }
}

impl Serialize for SectionToggle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SectionToggle::TopN(n) => serializer.serialize_u64(*n as u64),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for SectionToggle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Flag(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(SectionToggle::TopN(n as usize)),
            Raw::Flag(true) => Ok(SectionToggle::On),
            Raw::Flag(false) => Ok(SectionToggle::Off),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Everything the assembler needs besides the session and the host.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub host: String,
    pub user: String,
    pub database: String,
    pub interval_seconds: u64,
    pub format: OutputFormat,
    pub sections: BTreeMap<String, SectionToggle>,
    pub custom_sections: Vec<sections::CustomSection>,
    pub overview_key_buffer: bool,
}

impl ReportOptions {
    /// Toggle for `key`; unlisted sections are on.
    pub fn toggle(&self, key: &str) -> SectionToggle {
        self.sections.get(key).copied().unwrap_or_default()
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.toggle(key).is_on()
    }
}

/// Outcome counters of one report run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Streams sections to one sink, counting what was written or skipped.
struct SectionWriter<'a> {
    renderer: Box<dyn TableRenderer>,
    out: &'a mut dyn Write,
    summary: ReportSummary,
}

impl SectionWriter<'_> {
    fn write(&mut self, section: &ReportSection) -> Result<(), ReportError> {
        self.renderer.render(section, self.out)?;
        self.summary.written += 1;
        Ok(())
    }

    /// Writes a built section, or logs and skips a section-local failure.
    /// Fatal errors are returned.
    fn write_or_skip(
        &mut self,
        title: &str,
        built: Result<ReportSection, ReportError>,
    ) -> Result<(), ReportError> {
        match built {
            Ok(section) => self.write(&section),
            Err(e) if !e.is_fatal() => {
                warn!("Skipping section '{}': {}", title, e);
                self.summary.skipped += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn write_host(&mut self, title: &str, built: Result<ReportSection, String>) -> Result<(), ReportError> {
        match built {
            Ok(section) => self.write(&section),
            Err(e) => {
                warn!("Skipping host section '{}': {}", title, e);
                self.summary.skipped += 1;
                Ok(())
            }
        }
    }
}

/// Produces a complete report on `out`.
///
/// Host sections come first, then the two-sample overview (which sleeps
/// for the configured interval), the variable and log sections, the
/// pass-through catalog and finally the custom sections. Sections that fail
/// on their own are logged and skipped; connectivity loss, arity defects and
/// sink failures abort the run.
pub async fn generate_report<S, H>(
    session: &mut S,
    host: &H,
    options: &ReportOptions,
    out: &mut dyn Write,
) -> Result<ReportSummary, ReportError>
where
    S: Session,
    H: HostInspector,
{
    let caps = ServerCapabilities::detect(session).await?;
    info!(
        "Generating {} report for {}@{} (MySQL {})",
        options.format.as_str(),
        options.user,
        options.host,
        caps.version
    );

    let mut writer = SectionWriter {
        renderer: options.format.renderer(),
        out,
        summary: ReportSummary::default(),
    };
    writer
        .renderer
        .begin_report(&ReportHeader::current(), writer.out)?;
    writer.write(&basic_information(options, &caps)?)?;

    write_host_sections(&mut writer, host, options)?;

    if options.is_enabled("mysql_overview") {
        let built = overview_section(session, options).await;
        writer.write_or_skip(overview::OVERVIEW_TITLE, built)?;
    }

    if options.is_enabled("sys_parm") {
        let built = sections::system_parameter_section(session, &caps).await;
        writer.write_or_skip(sections::SYSTEM_PARAMETER_TITLE, built)?;
        let built = sections::optimizer_switch_section(session, &caps).await;
        writer.write_or_skip(sections::OPTIMIZER_SWITCH_TITLE, built)?;
    }

    if options.is_enabled("log_error_statistics") {
        let built = sections::log_error_section(session, &caps).await;
        writer.write_or_skip(sections::LOG_ERROR_TITLE, built)?;
    }

    for spec in sections::CATALOG {
        let toggle = options.toggle(spec.key);
        if !toggle.is_on() {
            continue;
        }
        if !spec.supported_by(&caps) {
            debug!("Section '{}' not supported by this server", spec.key);
            continue;
        }
        let limit = (spec.kind == SectionKind::TopN).then(|| toggle.limit());
        let title = spec.title_for(limit);
        let query = spec.render_query(&options.database, limit, caps.variables_schema());
        let built = match spec.column_styles() {
            Ok(styles) => sections::run_passthrough_section(session, &title, &query, &styles).await,
            Err(e) => Err(e),
        };
        writer.write_or_skip(&title, built)?;
    }

    for custom in &options.custom_sections {
        let styles = custom.column_styles()?;
        let built =
            sections::run_passthrough_section(session, &custom.title, &custom.query, &styles).await;
        writer.write_or_skip(&custom.title, built)?;
    }

    writer.renderer.end_report(writer.out)?;
    info!(
        "Report complete: {} sections written, {} skipped",
        writer.summary.written, writer.summary.skipped
    );
    Ok(writer.summary)
}

fn basic_information(
    options: &ReportOptions,
    caps: &ServerCapabilities,
) -> Result<ReportSection, ReportError> {
    let styles = ColumnStyles::parse_all(&["host,c", "user,c", "db,c", "mysql version,c"])?;
    Ok(ReportSection::new(BASIC_INFORMATION_TITLE, styles).with_rows(vec![vec![
        Cell::text(options.host.as_str()),
        Cell::text(options.user.as_str()),
        Cell::text(options.database.as_str()),
        Cell::text(caps.version.as_str()),
    ]]))
}

fn write_host_sections<H: HostInspector>(
    writer: &mut SectionWriter<'_>,
    host: &H,
    options: &ReportOptions,
) -> Result<(), ReportError> {
    if options.is_enabled("linux_info") {
        writer.write_host(crate::host::LINUX_INFO_TITLE, host.linux_info())?;
    }
    if options.is_enabled("filesystem_info") {
        writer.write_host(crate::host::FILESYSTEM_INFO_TITLE, host.filesystem_info())?;
    }
    if options.is_enabled("linux_overview") {
        writer.write_host(crate::host::LINUX_OVERVIEW_TITLE, host.linux_overview())?;
    }
    let memory = options.toggle("host_memory_topN");
    if memory.is_on() {
        writer.write_host("Host memory top", host.memory_top(memory.limit()))?;
    }
    Ok(())
}

/// Takes two status snapshots `interval` seconds apart and derives the
/// overview table.
async fn overview_section<S: Session>(
    session: &mut S,
    options: &ReportOptions,
) -> Result<ReportSection, ReportError> {
    let interval = options.interval_seconds;
    let first = take_snapshot(session, SampleSeq::First).await?;
    debug!("Sleeping {}s between status snapshots", interval);
    tokio::time::sleep(Duration::from_secs(interval)).await;
    let second = take_snapshot(session, SampleSeq::Second).await?;

    let uptime = second.uptime_seconds();
    if uptime.is_none() {
        warn!("Uptime counter missing from second snapshot, cumulative rates unavailable");
    }
    let metrics = overview::derive_with(&first, &second, interval, uptime, options.overview_key_buffer);
    Ok(overview::overview_section(&metrics, interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_parse() {
        assert_eq!("ON".parse::<SectionToggle>().unwrap(), SectionToggle::On);
        assert_eq!("off".parse::<SectionToggle>().unwrap(), SectionToggle::Off);
        assert_eq!("20".parse::<SectionToggle>().unwrap(), SectionToggle::TopN(20));
        assert!("maybe".parse::<SectionToggle>().is_err());
    }

    #[test]
    fn test_toggle_limit() {
        assert_eq!(SectionToggle::On.limit(), DEFAULT_TOP_N);
        assert_eq!(SectionToggle::TopN(3).limit(), 3);
        assert!(!SectionToggle::TopN(0).is_on());
        assert!(!SectionToggle::Off.is_on());
    }

    #[test]
    fn test_toggle_yaml() {
        let map: BTreeMap<String, SectionToggle> =
            serde_yaml::from_str("linux_info: OFF\nslow_query_topN: 20\nmetrics: ON\nreplication: true\n")
                .unwrap();
        assert_eq!(map["linux_info"], SectionToggle::Off);
        assert_eq!(map["slow_query_topN"], SectionToggle::TopN(20));
        assert_eq!(map["metrics"], SectionToggle::On);
        assert_eq!(map["replication"], SectionToggle::On);

        let yaml = serde_yaml::to_string(&map).unwrap();
        assert!(yaml.contains("linux_info: OFF"));
        assert!(yaml.contains("slow_query_topN: 20"));
    }

    #[test]
    fn test_known_section_keys() {
        let keys = known_section_keys();
        assert!(keys.contains(&"mysql_overview"));
        assert!(keys.contains(&"host_memory_topN"));
        assert!(keys.contains(&"innodb_lock_waits"));
        assert_eq!(keys.iter().filter(|k| **k == "host_summary").count(), 1);
    }
}
