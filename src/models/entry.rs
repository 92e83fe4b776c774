use crate::utils::time::default_day_end;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;

/// One in/out pair of a person's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub time_in: NaiveDateTime,
    pub time_out: Option<NaiveDateTime>,
}

impl LedgerEntry {
    /// Open entry starting at `time_in`
    pub fn open(time_in: NaiveDateTime) -> Self {
        Self {
            time_in,
            time_out: None,
        }
    }

    /// Closed entry. An out time earlier than the in time is clamped to it.
    pub fn closed(time_in: NaiveDateTime, time_out: NaiveDateTime) -> Self {
        Self {
            time_in,
            time_out: Some(time_out.max(time_in)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.time_out.is_none()
    }

    pub fn date(&self) -> NaiveDate {
        self.time_in.date()
    }

    /// Close the entry. Returns false (and changes nothing) when it was
    /// already closed.
    pub fn close(&mut self, time_out: NaiveDateTime) -> bool {
        if self.time_out.is_some() {
            return false;
        }
        self.time_out = Some(time_out.max(self.time_in));
        true
    }

    /// Open entries from an earlier day than `now` were never closed.
    pub fn is_stale(&self, now: NaiveDateTime) -> bool {
        self.is_open() && self.date() < now.date()
    }

    /// End used for durations: the out time, `now` for an open entry of
    /// today, or the default end of day for a stale one.
    pub fn effective_out(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self.time_out {
            Some(out) => out,
            None if self.is_stale(now) => default_day_end(self.time_in),
            None => now.max(self.time_in),
        }
    }

    pub fn duration(&self, now: NaiveDateTime) -> TimeDelta {
        self.effective_out(now) - self.time_in
    }
}
