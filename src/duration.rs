//! Human-readable durations for uptime rows.

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;

/// Units above seconds, largest first.
const UNITS: [(f64, char); 3] = [(DAY, 'd'), (HOUR, 'h'), (MINUTE, 'm')];

/// Formats a number of seconds as `1d1h1m1s`.
///
/// Leading zero units are dropped; once the largest non-zero unit has been
/// emitted every smaller unit follows, down to ceiling-rounded seconds
/// (`90000` renders as `1d1h0m0s`, `60` as `1m0s`, `59` as `59s`).
/// Inner zero units are never dropped: two days and thirty seconds is
/// `2d0h0m30s`, not `2d30s`.
pub fn format_duration(seconds: f64) -> String {
    let sec = seconds.max(0.0);
    if sec < MINUTE {
        return format!("{}s", sec.ceil() as u64);
    }
    decompose(sec, &UNITS, false)
}

fn decompose(sec: f64, units: &[(f64, char)], emitted: bool) -> String {
    match units.split_first() {
        None => format!("{}s", sec.ceil() as u64),
        Some((&(size, suffix), rest)) => {
            if emitted || sec >= size {
                let whole = (sec / size).floor();
                format!(
                    "{}{}{}",
                    whole as u64,
                    suffix,
                    decompose(sec - whole * size, rest, true)
                )
            } else {
                decompose(sec, rest, false)
            }
        }
    }
}
