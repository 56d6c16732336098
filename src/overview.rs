//! MySQL overview: derived metrics from two status snapshots.
//!
//! Every metric is a pure function over a [`SamplePair`]. Counters are
//! unsigned and monotonic, except across a server restart; deltas are
//! therefore computed signed and a negative delta is treated like a zero
//! denominator. A metric that cannot find one of its counters renders `N/A`
//! in both columns and the rest of the catalog is unaffected.

use tracing::{debug, warn};

use crate::duration::format_duration;
use crate::error::MissingCounterError;
use crate::snapshot::CounterSnapshot;
use crate::table::{Cell, ColumnStyle, ColumnStyles, ReportSection};

pub const OVERVIEW_TITLE: &str = "MySQL Overview";
pub const NOT_AVAILABLE: &str = "N/A";

const ZERO_RATE: &str = "0.0";
const ZERO_PERCENT: &str = "0.0%";
const ZERO_COUNT: &str = "0";

/// One row of the overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedMetric {
    pub name: &'static str,
    pub interval_value: String,
    pub cumulative_value: String,
}

impl DerivedMetric {
    fn unavailable(name: &'static str) -> Self {
        Self {
            name,
            interval_value: NOT_AVAILABLE.to_string(),
            cumulative_value: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Inputs shared by every metric function.
#[derive(Debug, Clone, Copy)]
pub struct SamplePair<'a> {
    pub first: &'a CounterSnapshot,
    pub second: &'a CounterSnapshot,
    pub interval_seconds: u64,
    /// Server `Uptime`; `None` when the second sample lacks it.
    pub uptime_seconds: Option<u64>,
}

impl SamplePair<'_> {
    /// `(first, second)` values of a counter; both must be present.
    fn values(&self, name: &str) -> Result<(u64, u64), MissingCounterError> {
        Ok((self.first.counter(name)?, self.second.counter(name)?))
    }

    /// Signed change of the sum of `names` plus the sum in the second sample.
    fn sum(&self, names: &[&str]) -> Result<(i128, u64), MissingCounterError> {
        let mut first: u64 = 0;
        let mut second: u64 = 0;
        for name in names {
            let (a, b) = self.values(name)?;
            first = first.saturating_add(a);
            second = second.saturating_add(b);
        }
        Ok((second as i128 - first as i128, second))
    }

    fn delta(&self, name: &str) -> Result<(i128, u64), MissingCounterError> {
        self.sum(&[name])
    }
}

type MetricFn = fn(&SamplePair<'_>) -> Result<(String, String), MissingCounterError>;

/// A named entry of the metric catalog.
pub struct MetricDef {
    pub name: &'static str,
    compute: MetricFn,
}

impl MetricDef {
    pub fn evaluate(&self, pair: &SamplePair<'_>) -> DerivedMetric {
        match (self.compute)(pair) {
            Ok((interval_value, cumulative_value)) => DerivedMetric {
                name: self.name,
                interval_value,
                cumulative_value,
            },
            Err(e) => {
                warn!("Overview metric '{}' unavailable: {}", self.name, e);
                DerivedMetric::unavailable(self.name)
            }
        }
    }
}

/// Canonical catalog, in report row order.
pub static CATALOG: &[MetricDef] = &[
    MetricDef { name: "Uptimes", compute: uptime },
    MetricDef { name: "QPS (Questions / Seconds)", compute: queries_per_second },
    MetricDef { name: "TPS ((Commit + Rollback)/ Seconds)", compute: transactions_per_second },
    MetricDef { name: "Reads per second", compute: reads_per_second },
    MetricDef { name: "Writes per second", compute: writes_per_second },
    MetricDef { name: "Read/Writes", compute: read_write_ratio },
    MetricDef { name: "Slow queries per second", compute: slow_queries_per_second },
    MetricDef { name: "Slow_queries/Questions", compute: slow_query_percent },
    MetricDef { name: "Threads connected", compute: threads_connected },
    MetricDef { name: "Aborted connects", compute: aborted_connects },
    MetricDef { name: "Thread cache hits (>90%)", compute: thread_cache_hits },
    MetricDef { name: "Innodb buffer hits(96% - 99%)", compute: buffer_pool_hits },
    MetricDef { name: "Innodb buffer pool utilization", compute: buffer_pool_utilization },
    MetricDef { name: "Query cache hits", compute: query_cache_hits },
    MetricDef { name: "Select full join per second", compute: full_joins_per_second },
    MetricDef { name: "full select in all select", compute: full_join_percent },
    MetricDef { name: "full table scans", compute: full_table_scans },
    MetricDef { name: "MyISAM Lock waiting ratio", compute: lock_contention },
    MetricDef { name: "Current open tables", compute: open_tables },
    MetricDef { name: "Accumulative open tables", compute: opened_tables },
    MetricDef { name: "Temp tables to disk(<10%)", compute: temp_tables_to_disk },
];

/// MyISAM key buffer rows, appended when enabled in configuration.
pub static KEY_BUFFER_CATALOG: &[MetricDef] = &[
    MetricDef { name: "Key buffer read hits(99.3% - 99.9%)", compute: key_buffer_read_hits },
    MetricDef { name: "Key buffer write hits(99.3% - 99.9%)", compute: key_buffer_write_hits },
];

/// Derives the canonical catalog from two snapshots.
pub fn derive(
    first: &CounterSnapshot,
    second: &CounterSnapshot,
    interval_seconds: u64,
    uptime_seconds: u64,
) -> Vec<DerivedMetric> {
    derive_with(first, second, interval_seconds, Some(uptime_seconds), false)
}

/// Like [`derive`], optionally appending the key buffer rows.
///
/// Without an uptime every cumulative rate, and the uptime row itself,
/// renders `N/A` in the total column.
pub fn derive_with(
    first: &CounterSnapshot,
    second: &CounterSnapshot,
    interval_seconds: u64,
    uptime_seconds: Option<u64>,
    key_buffer: bool,
) -> Vec<DerivedMetric> {
    let pair = SamplePair {
        first,
        second,
        interval_seconds,
        uptime_seconds,
    };
    let extra: &[MetricDef] = if key_buffer { KEY_BUFFER_CATALOG } else { &[] };
    let metrics: Vec<DerivedMetric> = CATALOG
        .iter()
        .chain(extra.iter())
        .map(|def| def.evaluate(&pair))
        .collect();
    debug!(
        "Derived {} overview metrics over {}s",
        metrics.len(),
        interval_seconds
    );
    metrics
}

/// Builds the overview table: `Key`, `In {interval}s`, `Total`.
pub fn overview_section(metrics: &[DerivedMetric], interval_seconds: u64) -> ReportSection {
    let styles = ColumnStyles::new(vec![
        ColumnStyle::left("Key"),
        ColumnStyle::right(format!("In {}s", interval_seconds)),
        ColumnStyle::right("Total"),
    ]);
    let rows = metrics
        .iter()
        .map(|m| {
            vec![
                Cell::text(m.name),
                Cell::text(m.interval_value.clone()),
                Cell::text(m.cumulative_value.clone()),
            ]
        })
        .collect();
    ReportSection::new(OVERVIEW_TITLE, styles).with_rows(rows)
}

// ---------------------------------------------------------------------------
// Value shapes
// ---------------------------------------------------------------------------

fn rate(amount: i128, seconds: u64) -> String {
    if amount < 0 || seconds == 0 {
        return ZERO_RATE.to_string();
    }
    crate::table::format_rounded(amount as f64 / seconds as f64)
}

fn percent(value: f64) -> String {
    format!("{}%", crate::table::format_rounded(value * 100.0))
}

/// `numerator / denominator` as a percentage.
fn ratio(numerator: i128, denominator: i128) -> String {
    if denominator <= 0 || numerator < 0 {
        return ZERO_PERCENT.to_string();
    }
    percent(numerator as f64 / denominator as f64)
}

/// `(1 - misses / requests)` as a percentage.
fn hit_rate(misses: i128, requests: i128) -> String {
    if requests <= 0 || misses < 0 {
        return ZERO_PERCENT.to_string();
    }
    percent(1.0 - misses as f64 / requests as f64)
}

fn count(delta: i128) -> String {
    if delta < 0 {
        ZERO_COUNT.to_string()
    } else {
        delta.to_string()
    }
}

fn rate_pair(p: &SamplePair<'_>, delta: i128, total: u64) -> (String, String) {
    let cumulative = match p.uptime_seconds {
        Some(uptime) => rate(total as i128, uptime),
        None => NOT_AVAILABLE.to_string(),
    };
    (rate(delta, p.interval_seconds), cumulative)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

fn uptime(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let total = p
        .uptime_seconds
        .map(|uptime| format_duration(uptime as f64))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    Ok((format!("{}s", p.interval_seconds), total))
}

fn queries_per_second(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (delta, total) = p.delta("Questions")?;
    Ok(rate_pair(p, delta, total))
}

fn transactions_per_second(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (delta, total) = p.sum(&["Com_commit", "Com_rollback"])?;
    Ok(rate_pair(p, delta, total))
}

fn reads_per_second(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (delta, total) = p.delta("Com_select")?;
    Ok(rate_pair(p, delta, total))
}

const WRITE_COUNTERS: [&str; 4] = ["Com_insert", "Com_update", "Com_delete", "Com_replace"];

fn writes_per_second(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (delta, total) = p.sum(&WRITE_COUNTERS)?;
    Ok(rate_pair(p, delta, total))
}

/// Reads per write, printed as a plain ratio; zero writes give `0.0%`.
fn read_write_ratio(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (reads, reads_total) = p.delta("Com_select")?;
    let (writes, writes_total) = p.sum(&WRITE_COUNTERS)?;

    let plain = |r: i128, w: i128| {
        if w <= 0 || r < 0 {
            ZERO_PERCENT.to_string()
        } else {
            crate::table::format_rounded(r as f64 / w as f64)
        }
    };
    Ok((
        plain(reads, writes),
        plain(reads_total as i128, writes_total as i128),
    ))
}

fn slow_queries_per_second(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (delta, total) = p.delta("Slow_queries")?;
    Ok(rate_pair(p, delta, total))
}

fn slow_query_percent(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (slow, slow_total) = p.delta("Slow_queries")?;
    let (questions, questions_total) = p.delta("Questions")?;
    Ok((
        ratio(slow, questions),
        ratio(slow_total as i128, questions_total as i128),
    ))
}

fn threads_connected(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (delta, current) = p.delta("Threads_connected")?;
    Ok((delta.to_string(), current.to_string()))
}

fn aborted_connects(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (delta, total) = p.delta("Aborted_connects")?;
    Ok((count(delta), total.to_string()))
}

fn thread_cache_hits(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (created, created_total) = p.delta("Threads_created")?;
    let (connections, connections_total) = p.delta("Connections")?;
    Ok((
        hit_rate(created, connections),
        hit_rate(created_total as i128, connections_total as i128),
    ))
}

fn buffer_pool_hits(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (reads, reads_total) = p.delta("Innodb_buffer_pool_reads")?;
    let (requests, requests_total) = p.delta("Innodb_buffer_pool_read_requests")?;
    Ok((
        hit_rate(reads, requests),
        hit_rate(reads_total as i128, requests_total as i128),
    ))
}

/// Used pages over total pages, once per sample rather than over the
/// interval.
fn buffer_pool_utilization(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (total1, total2) = p.values("Innodb_buffer_pool_pages_total")?;
    let (free1, free2) = p.values("Innodb_buffer_pool_pages_free")?;
    let used = |total: u64, free: u64| ratio(total.saturating_sub(free) as i128, total as i128);
    Ok((used(total1, free1), used(total2, free2)))
}

/// Hits over hits plus inserts.
fn query_cache_hits(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (hits, hits_total) = p.delta("Qcache_hits")?;
    let (inserts, inserts_total) = p.delta("Qcache_inserts")?;
    let lookups = if hits < 0 || inserts < 0 { 0 } else { hits + inserts };
    Ok((
        ratio(hits, lookups),
        ratio(hits_total as i128, hits_total as i128 + inserts_total as i128),
    ))
}

fn full_joins_per_second(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (delta, total) = p.delta("Select_full_join")?;
    Ok(rate_pair(p, delta, total))
}

fn full_join_percent(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (joins, joins_total) = p.delta("Select_full_join")?;
    let (selects, selects_total) = p.delta("Com_select")?;
    Ok((
        ratio(joins, selects),
        ratio(joins_total as i128, selects_total as i128),
    ))
}

const SCAN_COUNTERS: [&str; 2] = ["Handler_read_rnd_next", "Handler_read_rnd"];
const HANDLER_READ_COUNTERS: [&str; 6] = [
    "Handler_read_rnd_next",
    "Handler_read_rnd",
    "Handler_read_first",
    "Handler_read_next",
    "Handler_read_key",
    "Handler_read_prev",
];

/// Share of handler reads that walk the table rather than an index.
fn full_table_scans(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (scans, scans_total) = p.sum(&SCAN_COUNTERS)?;
    let (reads, reads_total) = p.sum(&HANDLER_READ_COUNTERS)?;
    Ok((
        ratio(scans, reads),
        ratio(scans_total as i128, reads_total as i128),
    ))
}

fn lock_contention(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (waited, waited_total) = p.delta("Table_locks_waited")?;
    let (immediate, immediate_total) = p.delta("Table_locks_immediate")?;
    Ok((
        ratio(waited, immediate),
        ratio(waited_total as i128, immediate_total as i128),
    ))
}

fn open_tables(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (delta, current) = p.delta("Open_tables")?;
    Ok((delta.to_string(), current.to_string()))
}

fn opened_tables(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (delta, total) = p.delta("Opened_tables")?;
    Ok((count(delta), total.to_string()))
}

fn temp_tables_to_disk(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (disk, disk_total) = p.delta("Created_tmp_disk_tables")?;
    let (tables, tables_total) = p.delta("Created_tmp_tables")?;
    Ok((
        ratio(disk, tables),
        ratio(disk_total as i128, tables_total as i128),
    ))
}

fn key_buffer_read_hits(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (reads, reads_total) = p.delta("Key_reads")?;
    let (requests, requests_total) = p.delta("Key_read_requests")?;
    Ok((
        hit_rate(reads, requests),
        hit_rate(reads_total as i128, requests_total as i128),
    ))
}

fn key_buffer_write_hits(p: &SamplePair<'_>) -> Result<(String, String), MissingCounterError> {
    let (writes, writes_total) = p.delta("Key_writes")?;
    let (requests, requests_total) = p.delta("Key_write_requests")?;
    Ok((
        hit_rate(writes, requests),
        hit_rate(writes_total as i128, requests_total as i128),
    ))
}
