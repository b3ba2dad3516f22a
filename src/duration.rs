use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
];

/// Parse duration strings like "1s", "250ms", "1.5s", "2m"
///
/// Zero, and anything that rounds down to zero nanoseconds, is rejected.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.trim().parse()?;
            if !val.is_finite() || val < 0.0 {
                bail!("Duration must be a non-negative number: {}", s);
            }
            let duration = Duration::from_nanos((val * multiplier) as u64);
            if duration.is_zero() {
                bail!("Duration must be greater than zero: {}", s);
            }
            return Ok(duration);
        }
    }

    bail!("Unknown duration format: {}", s)
}
