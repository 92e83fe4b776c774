use super::{entry::LedgerEntry, result::SignInOutResult, role::Role};
use crate::utils::time::{default_day_end, format_hm};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::collections::BTreeMap;

/// A team member and their in/out ledger.
///
/// Identity is the normalized full name ("Last, First"), compared without
/// regard to case. Entries are kept ordered by sign-in time.
#[derive(Debug, Clone)]
pub struct Person {
    last_name: String,
    first_name: String,
    role: Role,
    entries: Vec<LedgerEntry>,
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Person {}

impl Person {
    pub fn new(last_name: &str, first_name: &str, role: Role) -> Self {
        Self {
            last_name: last_name.trim().to_string(),
            first_name: first_name.trim().to_string(),
            role,
            entries: Vec::new(),
        }
    }

    /// Build a person from stored entries, sorting them by sign-in time.
    pub fn with_entries(
        last_name: &str,
        first_name: &str,
        role: Role,
        mut entries: Vec<LedgerEntry>,
    ) -> Self {
        entries.sort_by_key(|e| e.time_in);
        Self {
            entries,
            ..Self::new(last_name, first_name, role)
        }
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Registry key: the full name in lowercase.
    pub fn key(&self) -> String {
        Self::key_for(&self.full_name())
    }

    pub fn key_for(full_name: &str) -> String {
        full_name.to_lowercase()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Append entries from another record of the same person.
    pub fn merge(&mut self, other: Person) {
        self.entries.extend(other.entries);
        self.entries.sort_by_key(|e| e.time_in);
    }

    fn latest_today_index(&self, now: NaiveDateTime) -> Option<usize> {
        let today = now.date();
        self.entries.iter().rposition(|e| e.date() == today)
    }

    /// True when the latest entry dated today has no out time.
    pub fn is_signed_in_at(&self, now: NaiveDateTime) -> bool {
        self.latest_today_index(now)
            .map(|i| self.entries[i].is_open())
            .unwrap_or(false)
    }

    /// Most recent sign-in time today, if signed in.
    pub fn time_in_at(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.latest_today_index(now)
            .map(|i| &self.entries[i])
            .filter(|e| e.is_open())
            .map(|e| e.time_in)
    }

    pub fn oldest_entry(&self) -> Option<NaiveDateTime> {
        self.entries.first().map(|e| e.time_in)
    }

    pub fn sign_in_or_out(&mut self, signing_in: bool, now: NaiveDateTime) -> SignInOutResult {
        if signing_in {
            self.sign_in(now)
        } else {
            self.sign_out(now)
        }
    }

    pub fn toggle(&mut self, now: NaiveDateTime) -> SignInOutResult {
        let signing_in = !self.is_signed_in_at(now);
        self.sign_in_or_out(signing_in, now)
    }

    pub fn sign_in(&mut self, now: NaiveDateTime) -> SignInOutResult {
        if self.is_signed_in_at(now) {
            return SignInOutResult::failure("You are already signed in, scan \"OUT\" instead");
        }

        // An entry left open on an earlier day is closed at its default end,
        // so only one entry is ever open.
        for stale in self.entries.iter_mut().filter(|e| e.is_stale(now)) {
            let end = default_day_end(stale.time_in);
            stale.close(end);
        }

        let at = self.entries.partition_point(|e| e.time_in <= now);
        self.entries.insert(at, LedgerEntry::open(now));

        SignInOutResult::success(format!(
            "{} {} in at {}",
            self.first_name,
            self.last_name,
            format_hm(now)
        ))
    }

    pub fn sign_out(&mut self, now: NaiveDateTime) -> SignInOutResult {
        let open = self
            .latest_today_index(now)
            .filter(|&i| self.entries[i].is_open());

        match open {
            Some(i) => {
                self.entries[i].close(now);
                SignInOutResult::success(format!(
                    "{} {} out at {}",
                    self.first_name,
                    self.last_name,
                    format_hm(now)
                ))
            }
            None => SignInOutResult::failure("You are already signed out, scan \"IN\" instead"),
        }
    }

    /// Total time of entries that started after midnight of `cutoff`. An
    /// entry still open today counts up to `now`.
    pub fn duration_since(&self, cutoff: NaiveDate, now: NaiveDateTime) -> TimeDelta {
        let start = cutoff.and_time(NaiveTime::MIN);
        self.entries
            .iter()
            .filter(|e| e.time_in > start)
            .fold(TimeDelta::zero(), |acc, e| acc + e.duration(now))
    }

    /// Time spent per calendar day.
    pub fn day_totals(&self, now: NaiveDateTime) -> BTreeMap<NaiveDate, TimeDelta> {
        let mut days = BTreeMap::new();
        for e in &self.entries {
            let total = days.entry(e.date()).or_insert_with(TimeDelta::zero);
            *total = *total + e.duration(now);
        }
        days
    }

    /// Drop every entry that started before midnight of `cutoff`. Returns the
    /// number of entries removed.
    pub fn prune(&mut self, cutoff: NaiveDate) -> usize {
        let start = cutoff.and_time(NaiveTime::MIN);
        let before = self.entries.len();
        self.entries.retain(|e| e.time_in >= start);
        before - self.entries.len()
    }
}
