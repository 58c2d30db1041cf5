//! Wall-clock time and duration handling
//!
//! - `Clock` - Source of "now" in epoch milliseconds
//! - `SystemClock` - Real wall clock backed by chrono
//! - `ManualClock` - Hand-driven clock for deterministic tests and replays
//! - `parse_duration` / `format_duration` - Operator duration grammar

use crate::error::{Error, Result};
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Duration sentinel meaning "never expires"
pub const PERMANENT: i64 = -1;

/// Milliseconds in one second
pub const MILLIS_PER_SECOND: i64 = 1_000;

/// Source of the current time in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at the given epoch milliseconds
    pub fn at(millis: i64) -> Self {
        Self {
            now: AtomicI64::new(millis),
        }
    }

    /// Advance by whole seconds
    pub fn advance_secs(&self, secs: i64) {
        self.now.fetch_add(secs * MILLIS_PER_SECOND, Ordering::SeqCst);
    }

    /// Advance by milliseconds
    pub fn advance_millis(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set_millis(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Seconds per unit suffix accepted by [`parse_duration`]
fn unit_seconds(unit: char) -> Option<i64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3_600),
        'd' => Some(86_400),
        'w' => Some(604_800),
        'M' => Some(2_592_000),
        'y' => Some(31_536_000),
        _ => None,
    }
}

/// Parse an operator duration.
///
/// Accepts raw seconds (`3600`, `-1` for permanent, `0`) or one or more
/// unit-suffixed tokens that are summed (`30m`, `1d12h`, `2w`).
/// Units: `s` `m` `h` `d` `w` `M` (30 days) `y` (365 days).
pub fn parse_duration(input: &str) -> Result<i64> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidDuration("empty duration".to_string()));
    }

    if let Ok(secs) = input.parse::<i64>() {
        if secs < PERMANENT {
            return Err(Error::InvalidDuration(input.to_string()));
        }
        return Ok(secs);
    }

    let mut total: i64 = 0;
    let mut digits = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = unit_seconds(c).ok_or_else(|| Error::InvalidDuration(input.to_string()))?;
        if digits.is_empty() {
            return Err(Error::InvalidDuration(input.to_string()));
        }
        let value: i64 = digits
            .parse()
            .map_err(|_| Error::InvalidDuration(input.to_string()))?;
        total = value
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| Error::InvalidDuration(input.to_string()))?;
        digits.clear();
    }
    if !digits.is_empty() {
        // trailing number without a unit
        return Err(Error::InvalidDuration(input.to_string()));
    }

    Ok(total)
}

/// Render seconds compactly: `permanent`, `45s`, `12m`, `3h 5m`, `2d 4h`
pub fn format_duration(secs: i64) -> String {
    if secs == PERMANENT {
        return "permanent".to_string();
    }
    let secs = secs.max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3_600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h {}m", secs / 3_600, (secs % 3_600) / 60)
    } else {
        format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3_600)
    }
}

/// Render an epoch-millis instant as an RFC 3339 UTC timestamp
pub fn format_instant(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(at) => at.to_rfc3339(),
        None => format!("{millis}ms"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_seconds() {
        assert_eq!(parse_duration("3600").unwrap(), 3600);
        assert_eq!(parse_duration("-1").unwrap(), PERMANENT);
        assert_eq!(parse_duration("0").unwrap(), 0);
        assert!(parse_duration("-5").is_err());
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_duration("30s").unwrap(), 30);
        assert_eq!(parse_duration("5m").unwrap(), 300);
        assert_eq!(parse_duration("1d12h").unwrap(), 86_400 + 12 * 3_600);
        assert_eq!(parse_duration("2w").unwrap(), 2 * 604_800);
        // month and minute differ only by case
        assert_eq!(parse_duration("1M").unwrap(), 2_592_000);
        assert_eq!(parse_duration("1y").unwrap(), 31_536_000);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("1h30").is_err());
        assert!(parse_duration("99999999999999999999y").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(PERMANENT), "permanent");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(720), "12m");
        assert_eq!(format_duration(3 * 3600 + 5 * 60), "3h 5m");
        assert_eq!(format_duration(2 * 86_400 + 4 * 3600), "2d 4h");
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::at(1_000);
        clock.advance_secs(2);
        assert_eq!(clock.now_millis(), 3_000);
        clock.advance_millis(5);
        assert_eq!(clock.now_millis(), 3_005);
        clock.set_millis(0);
        assert_eq!(clock.now_millis(), 0);
    }

    #[test]
    fn test_format_instant() {
        assert_eq!(format_instant(0), "1970-01-01T00:00:00+00:00");
    }
}
