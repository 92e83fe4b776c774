#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use scanclock::config::SessionSettings;
use scanclock::errors::{AppError, AppResult};
use scanclock::models::Person;
use scanclock::store::LedgerStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub fn scl() -> Command {
    cargo_bin_cmd!("scanclock")
}

/// Season used across the tests: kickoff on Saturday 2025-01-04.
pub fn kickoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 4).expect("valid date")
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid timestamp")
}

/// Monday of the second season week, at `h:min`.
pub fn monday(h: u32, min: u32) -> NaiveDateTime {
    at(2025, 1, 13, h, min)
}

pub fn settings() -> SessionSettings {
    SessionSettings {
        scan_in_timeout: TimeDelta::seconds(10),
        scan_reset: TimeDelta::seconds(3),
        clear_status: TimeDelta::seconds(60),
        total_time_update: TimeDelta::seconds(300),
        kickoff: kickoff(),
        ship: NaiveDate::from_ymd_opt(2025, 2, 19),
    }
}

/// In-memory ledger that records what the coordinator saved.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub people: Arc<Mutex<Vec<Person>>>,
    pub saves: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn with_people(people: Vec<Person>) -> Self {
        Self {
            people: Arc::new(Mutex::new(people)),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn saved(&self, full_name: &str) -> Option<Person> {
        self.people
            .lock()
            .expect("store lock")
            .iter()
            .find(|p| p.full_name() == full_name)
            .cloned()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> AppResult<Vec<Person>> {
        Ok(self.people.lock().expect("store lock").clone())
    }

    fn save(&self, people: &[&Person]) -> AppResult<()> {
        *self.people.lock().expect("store lock") = people.iter().map(|p| (*p).clone()).collect();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Store whose writes always fail.
pub struct BrokenStore;

impl LedgerStore for BrokenStore {
    fn load(&self) -> AppResult<Vec<Person>> {
        Ok(Vec::new())
    }

    fn save(&self, _people: &[&Person]) -> AppResult<()> {
        Err(AppError::Io(std::io::Error::other("disk full")))
    }
}

/// Temporary kiosk home: a config file pointing at a ledger and an output
/// folder inside a fresh temp dir.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let env = Self {
            dir: TempDir::new().expect("temp dir"),
        };
        let yaml = format!(
            "data_file: '{}'\noutput_folder: '{}'\nkickoff: 2025-01-04\nship: 2025-02-19\n",
            env.data().display(),
            env.out().display()
        );
        fs::write(env.config(), yaml).expect("write config");
        env
    }

    pub fn config(&self) -> PathBuf {
        self.dir.path().join("scanclock.conf")
    }

    pub fn data(&self) -> PathBuf {
        self.dir.path().join("ScanData.xml")
    }

    pub fn out(&self) -> PathBuf {
        self.dir.path().join("reports")
    }

    pub fn backups(&self) -> PathBuf {
        self.dir.path().join("Backup")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = scl();
        cmd.env("HOME", self.dir.path())
            .arg("--config")
            .arg(self.config());
        cmd
    }

    pub fn write_ledger(&self, xml: &str) {
        fs::write(self.data(), xml).expect("write ledger");
    }

    pub fn read_ledger(&self) -> String {
        fs::read_to_string(self.data()).expect("read ledger")
    }
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
