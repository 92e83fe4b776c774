//! The scan session state machine.
//!
//! Raw input is buffered until a terminator arrives, the completed line is
//! classified, and either a person is selected (identity scan) or the
//! selected person is signed in or out (command scan). Deadlines for the
//! selection, the partial buffer, the published totals and the status line
//! live in one [`TimedEventSet`] polled by [`SessionCoordinator::on_clock_tick`].
//!
//! All session state sits behind a single mutex shared by the input path and
//! the clock tick, so a tick never observes a half-processed line and two
//! input sources cannot race on the registry.

use crate::config::SessionSettings;
use crate::core::events::{TimedEvent, TimedEventSet};
use crate::core::scan::{self, SCAN_TERMINATOR, ScanCommand, ScanToken};
use crate::core::summary;
use crate::errors::{AppError, AppResult};
use crate::models::{PeopleRegistry, Person, Role};
use crate::store::LedgerStore;
use crate::utils::time::{format_hm, now};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// Asks the operator to confirm signing everyone out.
pub type Confirmation = Box<dyn Fn() -> bool + Send + Sync>;

/// Receives a fresh snapshot after every visible change.
pub type Observer = Box<dyn Fn(&SessionSnapshot) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScanPhase {
    Idle,
    /// A name was scanned; waiting for IN or OUT
    AwaitingCommand { person: String },
    /// Characters received, no terminator yet
    BufferingInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedInPerson {
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub time_in: NaiveDateTime,
}

/// One line of the full roster.
#[derive(Debug, Clone, Serialize)]
pub struct RosterLine {
    pub full_name: String,
    pub role: Role,
    pub signed_in: bool,
    pub entries: usize,
    pub minutes_since_kickoff: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Totals {
    pub oldest_scan: Option<NaiveDateTime>,
    pub total_minutes: i64,
    pub computed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub taken_at: NaiveDateTime,
    pub phase: ScanPhase,
    pub status: String,
    /// Bumped every time a status is surfaced, even when the text repeats
    pub status_seq: u64,
    pub signed_in: Vec<SignedInPerson>,
    pub totals: Totals,
    pub pending_changes: usize,
    pub days_until_ship: Option<i64>,
}

struct SessionState {
    buffer: String,
    selected: Option<String>,
    registry: PeopleRegistry,
    events: TimedEventSet,
    change_count: usize,
    status: String,
    status_seq: u64,
    totals: Totals,
}

impl SessionState {
    fn phase(&self) -> ScanPhase {
        if !self.buffer.is_empty() {
            return ScanPhase::BufferingInput;
        }
        match &self.selected {
            Some(person) => ScanPhase::AwaitingCommand {
                person: person.clone(),
            },
            None => ScanPhase::Idle,
        }
    }
}

pub struct SessionCoordinator {
    settings: SessionSettings,
    store: Box<dyn LedgerStore>,
    state: Mutex<SessionState>,
    confirm_all_out: Option<Confirmation>,
    observer: Option<Observer>,
}

fn compute_totals(registry: &PeopleRegistry, kickoff: NaiveDate, now: NaiveDateTime) -> Totals {
    Totals {
        oldest_scan: registry.iter().filter_map(Person::oldest_entry).min(),
        total_minutes: registry
            .iter()
            .fold(TimeDelta::zero(), |acc, p| acc + p.duration_since(kickoff, now))
            .num_minutes(),
        computed_at: Some(now),
    }
}

impl SessionCoordinator {
    /// Load the registry from `store` and start an idle session.
    pub fn open(settings: SessionSettings, store: Box<dyn LedgerStore>) -> AppResult<Self> {
        Self::open_at(settings, store, now())
    }

    pub fn open_at(
        settings: SessionSettings,
        store: Box<dyn LedgerStore>,
        now: NaiveDateTime,
    ) -> AppResult<Self> {
        let registry = PeopleRegistry::from_people(store.load()?);

        let mut events = TimedEventSet::new();
        events.arm(TimedEvent::RecomputeTotals, now, settings.total_time_update);
        let totals = compute_totals(&registry, settings.kickoff, now);

        Ok(Self {
            state: Mutex::new(SessionState {
                buffer: String::new(),
                selected: None,
                registry,
                events,
                change_count: 0,
                status: String::new(),
                status_seq: 0,
                totals,
            }),
            settings,
            store,
            confirm_all_out: None,
            observer: None,
        })
    }

    /// Install the operator confirmation used by ALLOUTNOW. It runs while the
    /// session is locked and must not call back into the coordinator.
    pub fn with_all_out_confirmation(
        mut self,
        confirm: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Self {
        self.confirm_all_out = Some(Box::new(confirm));
        self
    }

    /// Install a callback that receives a snapshot after every change. It
    /// runs after the session lock is released.
    pub fn with_observer(
        mut self,
        observer: impl Fn(&SessionSnapshot) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, snapshot: Option<SessionSnapshot>) {
        if let (Some(observer), Some(snapshot)) = (&self.observer, snapshot) {
            observer(&snapshot);
        }
    }

    fn set_status(&self, state: &mut SessionState, status: impl Into<String>, now: NaiveDateTime) {
        state.status = status.into();
        state.status_seq += 1;
        state
            .events
            .arm(TimedEvent::ClearStatusMessage, now, self.settings.clear_status);
    }

    fn build_snapshot(&self, state: &SessionState, now: NaiveDateTime) -> SessionSnapshot {
        SessionSnapshot {
            taken_at: now,
            phase: state.phase(),
            status: state.status.clone(),
            status_seq: state.status_seq,
            signed_in: signed_in_list(&state.registry, now),
            totals: state.totals.clone(),
            pending_changes: state.change_count,
            days_until_ship: self.settings.ship.map(|ship| (ship - now.date()).num_days()),
        }
    }

    // ------------------------------------------------
    // Input
    // ------------------------------------------------

    pub fn handle_input(&self, text: &str) -> AppResult<()> {
        self.handle_input_at(text, now())
    }

    /// Feed raw scanner text. Every terminator completes a line; text after
    /// the last terminator stays buffered. Noise never fails; errors come
    /// only from committing or from a missing ALLOUTNOW confirmation. A
    /// failing line does not stop the lines after it; the first error is
    /// returned once the whole text has been processed.
    pub fn handle_input_at(&self, text: &str, now: NaiveDateTime) -> AppResult<()> {
        let mut state = self.lock();

        if !state.events.is_armed(TimedEvent::ResetPartialScan) {
            state
                .events
                .arm(TimedEvent::ResetPartialScan, now, self.settings.scan_reset);
        }

        let mut outcome = Ok(());
        let mut completed = false;
        for ch in text.chars() {
            state.buffer.push(ch);
            if ch != SCAN_TERMINATOR {
                continue;
            }

            let line = state.buffer.trim().to_string();
            state.buffer.clear();
            state.events.disarm(TimedEvent::ResetPartialScan);
            completed = true;

            if let Err(e) = self.process_line(&mut state, &line, now) {
                error!(scan = %line, error = %e, "scan could not be applied");
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }

        if !state.buffer.is_empty() && !state.events.is_armed(TimedEvent::ResetPartialScan) {
            state
                .events
                .arm(TimedEvent::ResetPartialScan, now, self.settings.scan_reset);
        }

        let snapshot = completed.then(|| self.build_snapshot(&state, now));
        drop(state);
        self.notify(snapshot);

        outcome
    }

    fn process_line(&self, state: &mut SessionState, line: &str, now: NaiveDateTime) -> AppResult<()> {
        match scan::parse(line) {
            ScanToken::Command(ScanCommand::AllOutNow) => {
                self.sign_all_out_locked(state, now)?;
            }
            ScanToken::Command(cmd) => {
                debug!(command = cmd.as_str(), "command scanned");
                self.apply_command(state, cmd == ScanCommand::In, now)?;
            }
            ScanToken::Identity(id) => {
                let person = state.registry.resolve_or_insert(id.to_person());
                let full_name = person.full_name();
                let prompt = format!("{}, sign in or out", person.first_name());

                debug!(person = %full_name, role = person.role().as_str(), "person selected");
                state.selected = Some(full_name);
                self.set_status(state, prompt, now);
                state
                    .events
                    .arm(TimedEvent::ResetSelectedPerson, now, self.settings.scan_in_timeout);
            }
            ScanToken::Rejected => {
                debug!(scan = %line, "ignored scan that is neither a name nor a command");
            }
        }
        Ok(())
    }

    fn apply_command(&self, state: &mut SessionState, signing_in: bool, now: NaiveDateTime) -> AppResult<()> {
        let Some(full_name) = state.selected.clone() else {
            self.set_status(state, "Please scan your name first", now);
            return Ok(());
        };

        state
            .events
            .arm(TimedEvent::ResetSelectedPerson, now, self.settings.scan_in_timeout);

        let result = match state.registry.get_mut(&full_name) {
            Some(person) => person.sign_in_or_out(signing_in, now),
            None => {
                state.selected = None;
                self.set_status(state, "Please scan your name first", now);
                return Ok(());
            }
        };

        if !result.succeeded {
            self.set_status(state, result.status, now);
            return Ok(());
        }

        info!(
            person = %full_name,
            direction = if signing_in { "in" } else { "out" },
            "sign-in ledger updated"
        );
        state.change_count += 1;
        state.selected = None;
        state.events.disarm(TimedEvent::ResetSelectedPerson);
        self.set_status(state, result.status, now);

        self.commit_locked(state)?;
        Ok(())
    }

    // ------------------------------------------------
    // Clock
    // ------------------------------------------------

    /// Poll every timed event once. Returns true when something changed.
    pub fn on_clock_tick(&self, now: NaiveDateTime) -> bool {
        let mut state = self.lock();
        let mut changed = false;

        for event in TimedEvent::ALL {
            if !state.events.check_expired(event, now) {
                continue;
            }
            changed = true;
            debug!(?event, "timed event expired");

            match event {
                TimedEvent::ResetSelectedPerson => {
                    if state.selected.take().is_some() {
                        self.set_status(
                            &mut state,
                            "You waited too long, please re-scan your name",
                            now,
                        );
                    }
                }
                TimedEvent::ResetPartialScan => state.buffer.clear(),
                TimedEvent::RecomputeTotals => {
                    state.totals = compute_totals(&state.registry, self.settings.kickoff, now);
                    state
                        .events
                        .arm(TimedEvent::RecomputeTotals, now, self.settings.total_time_update);
                }
                TimedEvent::ClearStatusMessage => state.status.clear(),
            }
        }

        let snapshot = changed.then(|| self.build_snapshot(&state, now));
        drop(state);
        self.notify(snapshot);

        changed
    }

    // ------------------------------------------------
    // Operations
    // ------------------------------------------------

    /// Persist the registry if anything changed since the last commit.
    /// Returns whether the ledger was written.
    pub fn commit(&self) -> AppResult<bool> {
        let mut state = self.lock();
        self.commit_locked(&mut state)
    }

    fn commit_locked(&self, state: &mut SessionState) -> AppResult<bool> {
        if state.change_count == 0 {
            return Ok(false);
        }

        {
            let people: Vec<&Person> = state.registry.iter().collect();
            if let Err(e) = self.store.save(&people) {
                error!(error = %e, pending = state.change_count, "failed to save the ledger");
                return Err(e);
            }
        }

        debug!(changes = state.change_count, "ledger committed");
        state.change_count = 0;
        Ok(true)
    }

    pub fn sign_all_out(&self) -> AppResult<Option<usize>> {
        self.sign_all_out_at(now())
    }

    /// Sign out everyone still signed in, after the operator confirms.
    /// Returns the number signed out, or `None` when the operator declined.
    pub fn sign_all_out_at(&self, now: NaiveDateTime) -> AppResult<Option<usize>> {
        let mut state = self.lock();
        let outcome = self.sign_all_out_locked(&mut state, now);
        let snapshot = Some(self.build_snapshot(&state, now));
        drop(state);
        self.notify(snapshot);
        outcome
    }

    fn sign_all_out_locked(&self, state: &mut SessionState, now: NaiveDateTime) -> AppResult<Option<usize>> {
        let Some(confirm) = self.confirm_all_out.as_ref() else {
            error!("sign-all-out requested but no confirmation callback is installed");
            return Err(AppError::MissingCollaborator("all-out confirmation"));
        };

        if !confirm() {
            self.set_status(state, "Sign everyone out command cancelled", now);
            return Ok(None);
        }

        let remaining: Vec<String> = state.registry.signed_in(now).map(Person::full_name).collect();
        for full_name in &remaining {
            if let Some(person) = state.registry.get_mut(full_name) {
                person.sign_out(now);
            }
        }
        state.change_count += remaining.len();

        info!(count = remaining.len(), "signed everyone out");
        self.set_status(
            state,
            format!(
                "Signed out all {} remaining at {}",
                remaining.len(),
                format_hm(now)
            ),
            now,
        );
        Ok(Some(remaining.len()))
    }

    /// Write the weekly CSV summaries into `out_dir`.
    pub fn create_summary_files(&self, out_dir: &Path) -> AppResult<Vec<PathBuf>> {
        let state = self.lock();
        let people = state.registry.sorted();
        summary::create_summary_files(out_dir, self.settings.kickoff, &people, now())
    }

    /// Drop all entries before `cutoff`. Returns the number removed.
    pub fn prune(&self, cutoff: NaiveDate) -> usize {
        let mut state = self.lock();
        let removed: usize = state.registry.iter_mut().map(|p| p.prune(cutoff)).sum();
        if removed > 0 {
            state.change_count += 1;
            let at = now();
            state.totals = compute_totals(&state.registry, self.settings.kickoff, at);
        }
        info!(%cutoff, removed, "ledger pruned");
        removed
    }

    // ------------------------------------------------
    // Queries
    // ------------------------------------------------

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_at(now())
    }

    pub fn snapshot_at(&self, now: NaiveDateTime) -> SessionSnapshot {
        let state = self.lock();
        self.build_snapshot(&state, now)
    }

    pub fn signed_in_people(&self) -> Vec<SignedInPerson> {
        signed_in_list(&self.lock().registry, now())
    }

    pub fn any_signed_in(&self) -> bool {
        self.lock().registry.signed_in(now()).next().is_some()
    }

    pub fn phase(&self) -> ScanPhase {
        self.lock().phase()
    }

    pub fn status(&self) -> String {
        self.lock().status.clone()
    }

    pub fn pending_changes(&self) -> usize {
        self.lock().change_count
    }

    pub fn person(&self, full_name: &str) -> Option<Person> {
        self.lock().registry.get(full_name).cloned()
    }

    pub fn roster_at(&self, now: NaiveDateTime) -> Vec<RosterLine> {
        let state = self.lock();
        state
            .registry
            .sorted()
            .into_iter()
            .map(|p| RosterLine {
                full_name: p.full_name(),
                role: p.role(),
                signed_in: p.is_signed_in_at(now),
                entries: p.entries().len(),
                minutes_since_kickoff: p.duration_since(self.settings.kickoff, now).num_minutes(),
            })
            .collect()
    }
}

fn signed_in_list(registry: &PeopleRegistry, now: NaiveDateTime) -> Vec<SignedInPerson> {
    registry
        .sorted()
        .into_iter()
        .filter_map(|p| {
            p.time_in_at(now).map(|time_in| SignedInPerson {
                full_name: p.full_name(),
                first_name: p.first_name().to_string(),
                last_name: p.last_name().to_string(),
                role: p.role(),
                time_in,
            })
        })
        .collect()
}
