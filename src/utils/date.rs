use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// First Saturday of January: the usual kickoff day.
pub fn default_kickoff(year: i32) -> NaiveDate {
    let mut d = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
    while d.weekday() != Weekday::Sat {
        d = d.succ_opt().unwrap_or(d);
    }
    d
}

/// First Wednesday after `season_weeks` full weeks from kickoff.
pub fn default_ship(kickoff: NaiveDate, season_weeks: u32) -> NaiveDate {
    let mut d = kickoff + TimeDelta::days(season_weeks as i64 * 7 + 1);
    while d.weekday() != Weekday::Wed {
        d = d.succ_opt().unwrap_or(d);
    }
    d
}

/// Season week number, starting at 1 on kickoff day. Days before kickoff
/// have no week.
pub fn season_week(kickoff: NaiveDate, date: NaiveDate) -> Option<u32> {
    let days = (date - kickoff).num_days();
    if days < 0 {
        return None;
    }
    Some((days / 7) as u32 + 1)
}

/// Season weeks run Saturday through Friday.
pub const SEASON_WEEK: [Weekday; 7] = [
    Weekday::Sat,
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
