use chrono::{NaiveDateTime, TimeDelta};

/// Deadlines the kiosk keeps track of. All of them are polled by a single
/// periodic tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimedEvent {
    /// Forget the person waiting for IN/OUT
    ResetSelectedPerson,
    /// Drop characters typed without a terminator
    ResetPartialScan,
    /// Recompute the published totals (recurring)
    RecomputeTotals,
    /// Blank the status line
    ClearStatusMessage,
}

impl TimedEvent {
    pub const ALL: [TimedEvent; 4] = [
        TimedEvent::ResetSelectedPerson,
        TimedEvent::ResetPartialScan,
        TimedEvent::RecomputeTotals,
        TimedEvent::ClearStatusMessage,
    ];

    fn index(self) -> usize {
        match self {
            TimedEvent::ResetSelectedPerson => 0,
            TimedEvent::ResetPartialScan => 1,
            TimedEvent::RecomputeTotals => 2,
            TimedEvent::ClearStatusMessage => 3,
        }
    }
}

/// One optional deadline per [`TimedEvent`].
///
/// `check_expired` is one-shot: an expired event is disarmed by the check
/// that reports it, and has to be armed again for another round.
#[derive(Debug, Default, Clone)]
pub struct TimedEventSet {
    deadlines: [Option<NaiveDateTime>; 4],
}

impl TimedEventSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline to `now + duration`, replacing any previous one. A
    /// deadline past the end of the calendar never expires.
    pub fn arm(&mut self, event: TimedEvent, now: NaiveDateTime, duration: TimeDelta) {
        let deadline = now
            .checked_add_signed(duration)
            .unwrap_or(NaiveDateTime::MAX);
        self.deadlines[event.index()] = Some(deadline);
    }

    pub fn disarm(&mut self, event: TimedEvent) {
        self.deadlines[event.index()] = None;
    }

    pub fn is_armed(&self, event: TimedEvent) -> bool {
        self.deadlines[event.index()].is_some()
    }

    pub fn deadline(&self, event: TimedEvent) -> Option<NaiveDateTime> {
        self.deadlines[event.index()]
    }

    pub fn check_expired(&mut self, event: TimedEvent, as_of: NaiveDateTime) -> bool {
        match self.deadlines[event.index()] {
            Some(deadline) if deadline < as_of => {
                self.deadlines[event.index()] = None;
                true
            }
            _ => false,
        }
    }
}
