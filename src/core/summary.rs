//! Weekly CSV summaries of student hours.
//!
//! One `Week N.csv` per season week, weeks running Saturday to Friday from
//! kickoff. Each student gets one row per entry of their busiest day that
//! week, with In/Out columns for every weekday and the week total on the
//! first row.

use crate::errors::AppResult;
use crate::models::{LedgerEntry, Person};
use crate::utils::date::{SEASON_WEEK, season_week, weekday_name};
use crate::utils::mins2readable;
use crate::utils::time::format_hm;
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};
use csv::Writer;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

type WeekRows<'a> = BTreeMap<String, Vec<&'a LedgerEntry>>;

fn is_week_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .map(|n| n.starts_with("Week ") && n.ends_with(".csv"))
        .unwrap_or(false)
}

fn out_cell(entry: &LedgerEntry, now: NaiveDateTime) -> String {
    match entry.time_out {
        Some(out) => format_hm(out),
        None if entry.is_stale(now) => format_hm(entry.effective_out(now)),
        None => String::new(),
    }
}

fn header() -> [Vec<String>; 2] {
    let mut days = vec!["Name".to_string()];
    let mut in_out = vec![String::new()];
    for day in SEASON_WEEK {
        days.push(weekday_name(day).to_string());
        days.push(String::new());
        in_out.push("In".to_string());
        in_out.push("Out".to_string());
    }
    days.push("Total".to_string());
    in_out.push(String::new());
    [days, in_out]
}

/// Rows for one student's week.
fn person_rows(name: &str, entries: &[&LedgerEntry], now: NaiveDateTime) -> Vec<Vec<String>> {
    let mut by_day: Vec<Vec<&LedgerEntry>> = vec![Vec::new(); SEASON_WEEK.len()];
    for entry in entries {
        if let Some(col) = SEASON_WEEK.iter().position(|d| *d == entry.date().weekday()) {
            by_day[col].push(*entry);
        }
    }
    for day in by_day.iter_mut() {
        day.sort_by_key(|e| e.time_in);
    }

    let total = entries
        .iter()
        .fold(TimeDelta::zero(), |acc, e| acc + e.duration(now));
    let lines = by_day.iter().map(Vec::len).max().unwrap_or(0);

    (0..lines)
        .map(|i| {
            let mut row = vec![name.to_string()];
            for day in &by_day {
                match day.get(i) {
                    Some(e) => {
                        row.push(format_hm(e.time_in));
                        row.push(out_cell(e, now));
                    }
                    None => {
                        row.push(String::new());
                        row.push(String::new());
                    }
                }
            }
            row.push(if i == 0 {
                mins2readable(total.num_minutes(), false)
            } else {
                String::new()
            });
            row
        })
        .collect()
}

/// Students' entries grouped by season week, then by full name.
fn group_by_week<'a>(people: &[&'a Person], kickoff: NaiveDate) -> BTreeMap<u32, WeekRows<'a>> {
    let mut weeks: BTreeMap<u32, WeekRows<'a>> = BTreeMap::new();
    for person in people.iter().copied().filter(|p| !p.role().is_mentor()) {
        for entry in person.entries() {
            if let Some(week) = season_week(kickoff, entry.date()) {
                weeks
                    .entry(week)
                    .or_default()
                    .entry(person.full_name())
                    .or_default()
                    .push(entry);
            }
        }
    }
    weeks
}

/// Replace every `Week *.csv` in `out_dir` with freshly computed summaries.
/// Returns the files written.
pub fn create_summary_files(
    out_dir: &Path,
    kickoff: NaiveDate,
    people: &[&Person],
    now: NaiveDateTime,
) -> AppResult<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;

    for old in fs::read_dir(out_dir)?.filter_map(|e| e.ok()).map(|e| e.path()) {
        if old.is_file() && is_week_file(&old) {
            fs::remove_file(&old)?;
        }
    }

    let mut written = Vec::new();
    for (week, students) in group_by_week(people, kickoff) {
        let path = out_dir.join(format!("Week {week}.csv"));
        let mut wtr = Writer::from_path(&path)?;

        for row in header() {
            wtr.write_record(&row)?;
        }
        for (name, entries) in &students {
            for row in person_rows(name, entries, now) {
                wtr.write_record(&row)?;
            }
        }

        wtr.flush()?;
        written.push(path);
    }

    info!(dir = %out_dir.display(), files = written.len(), "summary files written");
    Ok(written)
}
