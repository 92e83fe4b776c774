//! Time utilities: wall-clock now, ledger timestamp format, HH:MM display.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, Local, NaiveDateTime, NaiveTime, Weekday};

/// Timestamp layout written to the ledger file.
pub const LEDGER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn format_hm(t: NaiveDateTime) -> String {
    t.format("%H:%M").to_string()
}

pub fn format_ledger(t: NaiveDateTime) -> String {
    t.format(LEDGER_FORMAT).to_string()
}

/// Parse a ledger timestamp. Accepts the plain local form (with or without
/// fractional seconds) and RFC 3339 with an offset, which is converted to
/// local wall-clock time.
pub fn parse_ledger(s: &str) -> AppResult<NaiveDateTime> {
    let s = s.trim();
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(t);
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Local).naive_local());
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(t);
    }
    Err(AppError::InvalidTimestamp(s.to_string()))
}

/// Assumed end of a session nobody closed: 18:00 on weekends, 21:00 otherwise.
pub fn default_day_end(time_in: NaiveDateTime) -> NaiveDateTime {
    let hour = match time_in.weekday() {
        Weekday::Sat | Weekday::Sun => 18,
        _ => 21,
    };
    let end = time_in
        .date()
        .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN));
    end.max(time_in)
}
