use chrono::TimeDelta;
use scanclock::models::{LedgerEntry, PeopleRegistry, Person, Role};

mod common;
use common::{at, kickoff, monday};

fn jane() -> Person {
    Person::new("Doe", "Jane", Role::Student)
}

#[test]
fn sign_in_twice_fails_without_mutation() {
    let mut p = jane();

    let first = p.sign_in(monday(18, 0));
    assert!(first.succeeded);
    assert_eq!(first.status, "Jane Doe in at 18:00");

    let second = p.sign_in(monday(18, 5));
    assert!(!second.succeeded);
    assert_eq!(second.status, "You are already signed in, scan \"OUT\" instead");
    assert_eq!(p.entries().len(), 1);
    assert_eq!(p.entries()[0].time_in, monday(18, 0));
}

#[test]
fn sign_out_closes_todays_entry() {
    let mut p = jane();
    p.sign_in(monday(18, 0));

    let out = p.sign_out(monday(20, 30));
    assert!(out.succeeded);
    assert_eq!(out.status, "Jane Doe out at 20:30");
    assert_eq!(p.entries()[0].time_out, Some(monday(20, 30)));
    assert!(!p.is_signed_in_at(monday(20, 31)));
}

#[test]
fn sign_out_without_sign_in_is_refused() {
    let mut p = jane();
    let out = p.sign_out(monday(18, 0));
    assert!(!out.succeeded);
    assert_eq!(out.status, "You are already signed out, scan \"IN\" instead");
    assert!(!p.has_entries());
}

#[test]
fn toggle_alternates() {
    let mut p = jane();
    assert!(p.toggle(monday(18, 0)).succeeded);
    assert!(p.is_signed_in_at(monday(18, 1)));
    assert!(p.toggle(monday(19, 0)).succeeded);
    assert!(!p.is_signed_in_at(monday(19, 1)));
    assert_eq!(p.entries().len(), 1);
}

#[test]
fn open_entry_from_yesterday_does_not_count_as_signed_in() {
    let mut p = Person::with_entries(
        "Doe",
        "Jane",
        Role::Student,
        vec![LedgerEntry::open(at(2025, 1, 12, 10, 0))],
    );
    assert!(!p.is_signed_in_at(monday(9, 0)));

    // Signing in today closes the stale entry at the weekend end of day.
    assert!(p.sign_in(monday(9, 0)).succeeded);
    assert_eq!(p.entries()[0].time_out, Some(at(2025, 1, 12, 18, 0)));
    assert!(p.entries()[1].is_open());
}

#[test]
fn open_entry_counts_live() {
    let mut p = jane();
    p.sign_in(monday(18, 0));
    let total = p.duration_since(kickoff(), monday(19, 0));
    assert_eq!(total, TimeDelta::hours(1));
}

#[test]
fn duration_since_skips_entries_before_cutoff() {
    let p = Person::with_entries(
        "Doe",
        "Jane",
        Role::Student,
        vec![
            LedgerEntry::closed(at(2024, 12, 20, 18, 0), at(2024, 12, 20, 21, 0)),
            LedgerEntry::closed(at(2025, 1, 4, 9, 0), at(2025, 1, 4, 12, 30)),
            LedgerEntry::closed(monday(18, 0), monday(19, 15)),
        ],
    );
    let total = p.duration_since(kickoff(), monday(22, 0));
    assert_eq!(total, TimeDelta::minutes(3 * 60 + 30 + 75));
}

#[test]
fn stale_open_entry_counts_to_default_end() {
    // Friday entry never closed: weekday default end is 21:00.
    let p = Person::with_entries(
        "Doe",
        "Jane",
        Role::Student,
        vec![LedgerEntry::open(at(2025, 1, 10, 19, 0))],
    );
    assert_eq!(p.duration_since(kickoff(), monday(9, 0)), TimeDelta::hours(2));
}

#[test]
fn closed_entry_clamps_out_before_in() {
    let e = LedgerEntry::closed(monday(18, 0), monday(17, 0));
    assert_eq!(e.time_out, Some(monday(18, 0)));
    assert_eq!(e.duration(monday(20, 0)), TimeDelta::zero());
}

#[test]
fn day_totals_group_by_date() {
    let p = Person::with_entries(
        "Doe",
        "Jane",
        Role::Student,
        vec![
            LedgerEntry::closed(monday(9, 0), monday(10, 0)),
            LedgerEntry::closed(monday(13, 0), monday(13, 30)),
            LedgerEntry::closed(at(2025, 1, 14, 18, 0), at(2025, 1, 14, 19, 0)),
        ],
    );
    let days = p.day_totals(at(2025, 1, 15, 9, 0));
    assert_eq!(days.len(), 2);
    assert_eq!(days[&monday(0, 0).date()], TimeDelta::minutes(90));
}

#[test]
fn prune_drops_entries_before_cutoff() {
    let mut p = Person::with_entries(
        "Doe",
        "Jane",
        Role::Student,
        vec![
            LedgerEntry::closed(at(2024, 12, 20, 18, 0), at(2024, 12, 20, 21, 0)),
            LedgerEntry::closed(monday(18, 0), monday(19, 0)),
        ],
    );
    assert_eq!(p.prune(kickoff()), 1);
    assert_eq!(p.entries().len(), 1);
    assert_eq!(p.prune(kickoff()), 0);
}

#[test]
fn registry_merges_names_case_insensitively() {
    let registry = PeopleRegistry::from_people(vec![
        Person::with_entries(
            "Doe",
            "Jane",
            Role::Student,
            vec![LedgerEntry::closed(monday(18, 0), monday(19, 0))],
        ),
        Person::with_entries(
            "DOE",
            "jane",
            Role::Student,
            vec![LedgerEntry::closed(at(2025, 1, 11, 9, 0), at(2025, 1, 11, 12, 0))],
        ),
    ]);

    assert_eq!(registry.len(), 1);
    let p = registry.get("doe, JANE").expect("merged person");
    assert_eq!(p.entries().len(), 2);
    assert_eq!(p.entries()[0].time_in, at(2025, 1, 11, 9, 0));
}

#[test]
fn registry_resolves_existing_person() {
    let mut registry = PeopleRegistry::new();
    registry.resolve_or_insert(Person::new("Smith", "Bob", Role::Mentor));
    let again = registry.resolve_or_insert(Person::new("smith", "bob", Role::Student));
    assert_eq!(again.role(), Role::Mentor);
    assert_eq!(registry.len(), 1);
}

#[test]
fn registry_sorts_students_before_mentors() {
    let mut registry = PeopleRegistry::new();
    registry.resolve_or_insert(Person::new("Adams", "Ann", Role::Mentor));
    registry.resolve_or_insert(Person::new("Zed", "Zoe", Role::Student));
    registry.resolve_or_insert(Person::new("Brown", "Bo", Role::Student));

    let names: Vec<String> = registry.sorted().iter().map(|p| p.full_name()).collect();
    assert_eq!(names, ["Brown, Bo", "Zed, Zoe", "Adams, Ann"]);
}
