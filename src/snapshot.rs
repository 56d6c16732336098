//! Global status counter snapshots.

use ahash::AHashMap as HashMap;
use tracing::debug;

use crate::error::{MissingCounterError, ReportError};
use crate::session::Session;
use crate::table::Cell;

pub const STATUS_QUERY: &str = "SHOW GLOBAL STATUS";

/// Which of the two samples a snapshot is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSeq {
    First,
    Second,
}

impl SampleSeq {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleSeq::First => "first",
            SampleSeq::Second => "second",
        }
    }
}

/// Every global status variable at one instant, values kept as strings.
#[derive(Debug, Clone)]
pub struct CounterSnapshot {
    pub sequence: SampleSeq,
    counters: HashMap<String, String>,
}

impl CounterSnapshot {
    pub fn from_pairs<I, K, V>(sequence: SampleSeq, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let counters = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { sequence, counters }
    }

    /// Numeric value of `name`. Absent or non-integer values are errors.
    pub fn counter(&self, name: &str) -> Result<u64, MissingCounterError> {
        self.counters
            .get(name)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| MissingCounterError {
                counter: name.to_string(),
                sequence: self.sequence.as_str(),
            })
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.counters.get(name).map(String::as_str)
    }

    /// `Uptime` in seconds, when the server reports it.
    pub fn uptime_seconds(&self) -> Option<u64> {
        self.counter("Uptime").ok()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// Captures one snapshot of `SHOW GLOBAL STATUS`.
///
/// Any failure, including a server-side error such as a missing privilege,
/// is reported as [`ReportError::Connectivity`]: without status counters
/// there is no overview to fall back to.
pub async fn take_snapshot<S: Session>(
    session: &mut S,
    sequence: SampleSeq,
) -> Result<CounterSnapshot, ReportError> {
    let rows = session.execute(STATUS_QUERY).await.map_err(|e| match e {
        ReportError::Query(err) => ReportError::Connectivity(err),
        other => other,
    })?;
    let pairs = rows.into_iter().filter_map(|row| {
        let mut cells = row.into_iter();
        match (cells.next(), cells.next()) {
            (Some(Cell::Text(name)), Some(value)) => {
                let value = match value {
                    Cell::Null => String::new(),
                    other => other.to_string(),
                };
                Some((name, value))
            }
            _ => None,
        }
    });
    let snapshot = CounterSnapshot::from_pairs(sequence, pairs);
    debug!(
        "Captured {} snapshot with {} counters",
        sequence.as_str(),
        snapshot.len()
    );
    Ok(snapshot)
}
