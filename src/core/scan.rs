//! Classification of completed scan lines.
//!
//! A line is either a command word (`IN`, `OUT`, `ALLOUTNOW`), a name
//! (`Last,First`, optionally prefixed with `MENTOR` and separator characters)
//! or noise.

use crate::models::{Person, Role};
use regex::Regex;
use std::sync::LazyLock;

/// Character that completes a scan.
pub const SCAN_TERMINATOR: char = '\r';

static MENTOR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\Amentor[^a-z]+").expect("valid mentor pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCommand {
    In,
    Out,
    AllOutNow,
}

impl ScanCommand {
    /// Exact, case-insensitive match on a command word. Anything else is
    /// not a command.
    pub fn from_word(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Some(Self::In),
            "OUT" => Some(Self::Out),
            "ALLOUTNOW" => Some(Self::AllOutNow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanCommand::In => "IN",
            ScanCommand::Out => "OUT",
            ScanCommand::AllOutNow => "ALLOUTNOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityScan {
    pub last_name: String,
    pub first_name: String,
    pub role: Role,
}

impl IdentityScan {
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// A fresh person with no entries, used when the name is not registered.
    pub fn to_person(&self) -> Person {
        Person::new(&self.last_name, &self.first_name, self.role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanToken {
    Identity(IdentityScan),
    Command(ScanCommand),
    Rejected,
}

pub fn parse(raw: &str) -> ScanToken {
    let input = raw.trim();
    if input.is_empty() {
        return ScanToken::Rejected;
    }

    if let Some(cmd) = ScanCommand::from_word(input) {
        return ScanToken::Command(cmd);
    }

    if !input.contains(',') {
        return ScanToken::Rejected;
    }

    // The prefix only counts when a full name is left behind it, so a
    // surname of "Mentor" still scans as a student.
    let (role, names) = match MENTOR_PREFIX.find(input) {
        Some(m) if input[m.end()..].contains(',') => (Role::Mentor, &input[m.end()..]),
        _ => (Role::Student, input),
    };

    let mut parts = names.split(',');
    let last = parts.next().unwrap_or("").trim();
    let first = parts.next_back().unwrap_or("").trim();

    if last.is_empty() || first.is_empty() {
        return ScanToken::Rejected;
    }

    ScanToken::Identity(IdentityScan {
        last_name: last.to_string(),
        first_name: first.to_string(),
        role,
    })
}
