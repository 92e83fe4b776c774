use chrono::TimeDelta;
use scanclock::core::coordinator::{ScanPhase, SessionCoordinator};
use scanclock::errors::AppError;
use scanclock::models::{LedgerEntry, Person, Role};
use std::sync::{Arc, Mutex};

mod common;
use common::{BrokenStore, MemoryStore, at, kickoff, monday, settings};

fn open(store: &MemoryStore) -> SessionCoordinator {
    SessionCoordinator::open_at(settings(), Box::new(store.clone()), monday(18, 0))
        .expect("open coordinator")
}

fn secs(n: i64) -> TimeDelta {
    TimeDelta::seconds(n)
}

fn signed_in_names(c: &SessionCoordinator, now: chrono::NaiveDateTime) -> Vec<String> {
    c.snapshot_at(now)
        .signed_in
        .into_iter()
        .map(|p| p.full_name)
        .collect()
}

#[test]
fn identity_then_in_signs_the_person_in() {
    let store = MemoryStore::default();
    let c = open(&store);
    let t0 = monday(18, 0);

    c.handle_input_at("Doe,Jane\r", t0).expect("identity scan");
    assert_eq!(
        c.phase(),
        ScanPhase::AwaitingCommand {
            person: "Doe, Jane".to_string()
        }
    );
    assert_eq!(c.status(), "Jane, sign in or out");

    c.handle_input_at("IN\r", t0 + secs(2)).expect("command scan");
    assert_eq!(c.phase(), ScanPhase::Idle);
    assert_eq!(c.status(), "Jane Doe in at 18:00");
    assert_eq!(signed_in_names(&c, t0 + secs(3)), ["Doe, Jane"]);

    // A successful sign-in is committed right away.
    assert_eq!(c.pending_changes(), 0);
    assert_eq!(store.save_count(), 1);
    let saved = store.saved("Doe, Jane").expect("saved person");
    assert!(saved.entries()[0].is_open());
}

#[test]
fn second_in_without_identity_asks_for_a_name() {
    let store = MemoryStore::default();
    let c = open(&store);
    let t0 = monday(18, 0);

    c.handle_input_at("Doe,Jane\r", t0).expect("identity");
    c.handle_input_at("IN\r", t0 + secs(1)).expect("in");
    c.handle_input_at("IN\r", t0 + secs(2)).expect("second in");

    assert_eq!(c.status(), "Please scan your name first");
    assert_eq!(store.save_count(), 1);
    let jane = c.person("Doe, Jane").expect("registered");
    assert_eq!(jane.entries().len(), 1);
}

#[test]
fn mentor_scan_signs_in_a_mentor() {
    let store = MemoryStore::default();
    let c = open(&store);
    let t0 = monday(18, 0);

    c.handle_input_at("MENTOR - Smith,Bob\r", t0).expect("identity");
    c.handle_input_at("IN\r", t0 + secs(1)).expect("in");

    let bob = c.person("Smith, Bob").expect("registered");
    assert_eq!(bob.role(), Role::Mentor);
    assert!(bob.is_signed_in_at(t0 + secs(5)));
    assert_eq!(c.status(), "Bob Smith in at 18:00");
}

#[test]
fn refused_sign_in_keeps_the_selection_and_writes_nothing() {
    let store = MemoryStore::default();
    let c = open(&store);
    let t0 = monday(18, 0);

    c.handle_input_at("Doe,Jane\rIN\r", t0).expect("sign in");
    c.handle_input_at("Doe,Jane\rIN\r", t0 + secs(5)).expect("sign in again");

    assert_eq!(c.status(), "You are already signed in, scan \"OUT\" instead");
    assert_eq!(
        c.phase(),
        ScanPhase::AwaitingCommand {
            person: "Doe, Jane".to_string()
        }
    );
    assert_eq!(store.save_count(), 1);

    c.handle_input_at("OUT\r", t0 + secs(6)).expect("out");
    assert_eq!(c.status(), "Jane Doe out at 18:00");
    assert_eq!(store.save_count(), 2);
    assert!(signed_in_names(&c, t0 + secs(7)).is_empty());
}

#[test]
fn keystrokes_build_up_a_scan() {
    let store = MemoryStore::default();
    let c = open(&store);
    let t0 = monday(18, 0);

    for ch in "Doe,Jane".chars() {
        c.handle_input_at(&ch.to_string(), t0).expect("keystroke");
    }
    assert_eq!(c.phase(), ScanPhase::BufferingInput);

    c.handle_input_at("\r", t0).expect("terminator");
    assert_eq!(
        c.phase(),
        ScanPhase::AwaitingCommand {
            person: "Doe, Jane".to_string()
        }
    );
}

#[test]
fn waiting_too_long_drops_the_selection() {
    let store = MemoryStore::default();
    let c = open(&store);
    let t0 = monday(18, 0);

    c.handle_input_at("Doe,Jane\r", t0).expect("identity");
    assert!(!c.on_clock_tick(t0 + secs(5)));
    assert!(c.on_clock_tick(t0 + secs(11)));

    assert_eq!(c.phase(), ScanPhase::Idle);
    assert_eq!(c.status(), "You waited too long, please re-scan your name");

    c.handle_input_at("IN\r", t0 + secs(12)).expect("late in");
    assert_eq!(c.status(), "Please scan your name first");
    assert_eq!(store.save_count(), 0);
}

#[test]
fn unterminated_input_is_discarded_after_the_reset_window() {
    let store = MemoryStore::default();
    let c = open(&store);
    let t0 = monday(18, 0);

    c.handle_input_at("Doe,Ja", t0).expect("partial");
    assert_eq!(c.phase(), ScanPhase::BufferingInput);

    assert!(c.on_clock_tick(t0 + secs(4)));
    assert_eq!(c.phase(), ScanPhase::Idle);

    // The tail alone is noise.
    c.handle_input_at("ne\r", t0 + secs(5)).expect("tail");
    assert_eq!(c.phase(), ScanPhase::Idle);
    assert!(c.person("Doe, Jane").is_none());
}

#[test]
fn noise_is_ignored() {
    let store = MemoryStore::default();
    let c = open(&store);

    c.handle_input_at("hello world\r\r", monday(18, 0)).expect("noise");
    assert_eq!(c.phase(), ScanPhase::Idle);
    assert_eq!(c.status(), "");
    assert_eq!(c.pending_changes(), 0);
}

#[test]
fn status_line_clears_after_its_window() {
    let store = MemoryStore::default();
    let c = open(&store);
    let t0 = monday(18, 0);

    c.handle_input_at("IN\r", t0).expect("in");
    assert_eq!(c.status(), "Please scan your name first");

    c.on_clock_tick(t0 + secs(61));
    assert_eq!(c.status(), "");
}

fn two_signed_in(store: &MemoryStore) -> SessionCoordinator {
    let c = open(store);
    let t0 = monday(18, 0);
    c.handle_input_at("Doe,Jane\rIN\r", t0).expect("jane");
    c.handle_input_at("MENTOR - Smith,Bob\rIN\r", t0).expect("bob");
    c
}

#[test]
fn all_out_now_signs_everyone_out() {
    let store = MemoryStore::default();
    let c = two_signed_in(&store).with_all_out_confirmation(|| true);
    let t = monday(20, 0);

    c.handle_input_at("ALLOUTNOW\r", t).expect("all out");

    assert_eq!(c.status(), "Signed out all 2 remaining at 20:00");
    assert!(signed_in_names(&c, t).is_empty());
    assert_eq!(c.pending_changes(), 2);
    let jane = c.person("Doe, Jane").expect("jane");
    assert_eq!(jane.entries()[0].time_out, Some(t));

    assert!(c.commit().expect("commit"));
    assert_eq!(c.pending_changes(), 0);
}

#[test]
fn declined_all_out_changes_nothing() {
    let store = MemoryStore::default();
    let c = two_signed_in(&store).with_all_out_confirmation(|| false);
    let t = monday(20, 0);

    assert_eq!(c.sign_all_out_at(t).expect("declined"), None);
    assert_eq!(c.status(), "Sign everyone out command cancelled");
    assert_eq!(signed_in_names(&c, t).len(), 2);
    assert_eq!(c.pending_changes(), 0);
}

#[test]
fn all_out_without_confirmation_fails_loudly() {
    let store = MemoryStore::default();
    let c = two_signed_in(&store);
    let t = monday(20, 0);

    let err = c.handle_input_at("ALLOUTNOW\r", t).expect_err("must fail");
    assert!(matches!(err, AppError::MissingCollaborator(_)));
    assert_eq!(signed_in_names(&c, t).len(), 2);

    assert!(matches!(
        c.sign_all_out_at(t),
        Err(AppError::MissingCollaborator(_))
    ));
}

#[test]
fn sign_all_out_returns_the_count() {
    let store = MemoryStore::default();
    let c = two_signed_in(&store).with_all_out_confirmation(|| true);
    assert_eq!(c.sign_all_out_at(monday(21, 0)).expect("all out"), Some(2));
    assert_eq!(c.sign_all_out_at(monday(21, 1)).expect("nobody left"), Some(0));
}

#[test]
fn commit_only_writes_pending_changes() {
    let store = MemoryStore::default();
    let c = open(&store);
    assert!(!c.commit().expect("nothing to commit"));
    assert_eq!(store.save_count(), 0);
}

#[test]
fn commit_failure_propagates_and_keeps_changes_pending() {
    let c = SessionCoordinator::open_at(settings(), Box::new(BrokenStore), monday(18, 0))
        .expect("open");

    c.handle_input_at("Doe,Jane\r", monday(18, 0)).expect("identity");
    let err = c
        .handle_input_at("IN\r", monday(18, 0))
        .expect_err("save must fail");
    assert!(matches!(err, AppError::Io(_)));
    assert_eq!(c.pending_changes(), 1);
    assert!(c.commit().is_err());
}

#[test]
fn totals_are_recomputed_on_their_schedule() {
    let store = MemoryStore::with_people(vec![Person::with_entries(
        "Lee",
        "Sam",
        Role::Student,
        vec![LedgerEntry::closed(at(2025, 1, 11, 9, 0), at(2025, 1, 11, 10, 0))],
    )]);
    let c = open(&store);
    let t0 = monday(18, 0);

    let totals = c.snapshot_at(t0).totals;
    assert_eq!(totals.total_minutes, 60);
    assert_eq!(totals.oldest_scan, Some(at(2025, 1, 11, 9, 0)));

    c.handle_input_at("Doe,Jane\rIN\r", t0).expect("sign in");
    assert_eq!(c.snapshot_at(t0 + secs(60)).totals.total_minutes, 60);

    assert!(c.on_clock_tick(monday(18, 10)));
    assert_eq!(c.snapshot_at(monday(18, 10)).totals.total_minutes, 70);
}

#[test]
fn snapshot_reports_days_until_ship() {
    let store = MemoryStore::default();
    let c = open(&store);
    assert_eq!(c.snapshot_at(monday(18, 0)).days_until_ship, Some(37));
}

#[test]
fn observer_sees_every_status() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let store = MemoryStore::default();
    let c = open(&store).with_observer(move |snap| {
        sink.lock().expect("sink").push(snap.status.clone());
    });
    let t0 = monday(18, 0);

    c.handle_input_at("Doe,Jane\r", t0).expect("identity");
    c.handle_input_at("IN\r", t0).expect("in");
    c.on_clock_tick(t0 + secs(61));

    let seen = seen.lock().expect("seen");
    assert_eq!(
        *seen,
        ["Jane, sign in or out", "Jane Doe in at 18:00", ""]
    );
}

#[test]
fn prune_removes_old_entries() {
    let store = MemoryStore::with_people(vec![Person::with_entries(
        "Lee",
        "Sam",
        Role::Student,
        vec![
            LedgerEntry::closed(at(2024, 12, 1, 9, 0), at(2024, 12, 1, 10, 0)),
            LedgerEntry::closed(at(2025, 1, 11, 9, 0), at(2025, 1, 11, 10, 0)),
        ],
    )]);
    let c = open(&store);

    assert_eq!(c.prune(kickoff()), 1);
    assert!(c.commit().expect("commit"));
    let sam = store.saved("Lee, Sam").expect("saved");
    assert_eq!(sam.entries().len(), 1);

    assert_eq!(c.prune(kickoff()), 0);
    assert!(!c.commit().expect("nothing left"));
}

#[test]
fn roster_lists_everyone() {
    let store = MemoryStore::default();
    let c = two_signed_in(&store);
    let roster = c.roster_at(monday(19, 0));

    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0].full_name, "Doe, Jane");
    assert!(roster[0].signed_in);
    assert_eq!(roster[0].minutes_since_kickoff, 60);
    assert_eq!(roster[1].role, Role::Mentor);
}

#[test]
fn repeated_status_still_counts_as_new() {
    let store = MemoryStore::default();
    let c = open(&store);
    let t0 = monday(18, 0);

    c.handle_input_at("IN\r", t0).expect("first");
    let first = c.snapshot_at(t0);
    c.handle_input_at("IN\r", t0 + secs(1)).expect("second");
    let second = c.snapshot_at(t0 + secs(1));

    assert_eq!(first.status, second.status);
    assert_eq!(second.status_seq, first.status_seq + 1);

    // clearing the line is not a new status
    c.on_clock_tick(t0 + secs(62));
    assert_eq!(c.snapshot_at(t0 + secs(62)).status_seq, second.status_seq);
}

#[test]
fn failing_line_does_not_swallow_the_rest() {
    let store = MemoryStore::default();
    let c = open(&store);
    let t0 = monday(18, 0);

    let err = c
        .handle_input_at("Doe,Jane\rIN\rALLOUTNOW\rSmith,Bob\r", t0)
        .expect_err("no confirmation installed");
    assert!(matches!(err, AppError::MissingCollaborator(_)));

    assert_eq!(signed_in_names(&c, t0), ["Doe, Jane"]);
    assert_eq!(
        c.phase(),
        ScanPhase::AwaitingCommand {
            person: "Smith, Bob".to_string()
        }
    );
}

#[test]
fn commit_failure_mid_chunk_keeps_processing() {
    let c = SessionCoordinator::open_at(settings(), Box::new(BrokenStore), monday(18, 0))
        .expect("open");

    let err = c
        .handle_input_at("Doe,Jane\rIN\rLee,Sam\r", monday(18, 0))
        .expect_err("save must fail");
    assert!(matches!(err, AppError::Io(_)));
    assert_eq!(
        c.phase(),
        ScanPhase::AwaitingCommand {
            person: "Lee, Sam".to_string()
        }
    );
}

#[test]
fn concurrent_scans_resolve_to_one_person() {
    let store = MemoryStore::default();
    let c = Arc::new(open(&store));
    let t0 = monday(18, 0);

    std::thread::scope(|s| {
        for name in ["Doe,Jane\r", "DOE , jane\r"] {
            let c = Arc::clone(&c);
            s.spawn(move || {
                for _ in 0..200 {
                    c.handle_input_at(name, t0).expect("identity");
                    c.handle_input_at("IN\r", t0).expect("in");
                }
            });
        }

        let c = Arc::clone(&c);
        s.spawn(move || {
            for _ in 0..200 {
                c.on_clock_tick(t0 + secs(4));
                // every input call ends on a terminator, so a tick never
                // lands between a line's characters
                assert_ne!(c.phase(), ScanPhase::BufferingInput);
            }
        });
    });

    let roster = c.roster_at(t0);
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].full_name.to_lowercase(), "doe, jane");

    let jane = c.person("Doe, Jane").expect("one person");
    assert_eq!(jane.entries().iter().filter(|e| e.is_open()).count(), 1);
    assert_eq!(jane.entries().len(), 1);
}

#[test]
fn ticks_between_chunks_never_see_a_partial_line() {
    let store = MemoryStore::default();
    let c = Arc::new(open(&store));
    let t0 = monday(18, 0);

    std::thread::scope(|s| {
        let typist = Arc::clone(&c);
        s.spawn(move || {
            for _ in 0..100 {
                typist
                    .handle_input_at("Doe,Jane\rIN\rDoe,Jane\rOUT\r", t0)
                    .expect("scan");
            }
        });

        let clock = Arc::clone(&c);
        s.spawn(move || {
            for _ in 0..100 {
                clock.on_clock_tick(t0 + secs(4));
                let snap = clock.snapshot_at(t0);
                assert_ne!(snap.phase, ScanPhase::BufferingInput);
            }
        });
    });

    let jane = c.person("Doe, Jane").expect("registered");
    assert!(jane.entries().iter().all(|e| !e.is_open()));
}
