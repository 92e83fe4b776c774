//! Formatting utilities used for terminal listings and summary reports.

pub fn pad_right(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

/// Minutes as `HHh MMm`, or `HH:MM` when `short`. Negative values keep a
/// leading minus.
pub fn mins2readable(mins: i64, short: bool) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let (hours, minutes) = (mins.abs() / 60, mins.abs() % 60);

    if short {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}h {minutes:02}m")
    }
}
