use serde::Serialize;

/// Team role. Students sort before mentors in the saved ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Role {
    Student,
    Mentor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Mentor => "Mentor",
        }
    }

    /// Convert ledger attribute → enum. Anything unrecognised is a student.
    pub fn from_attr(s: Option<&str>) -> Self {
        match s.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "mentor" => Role::Mentor,
            _ => Role::Student,
        }
    }

    pub fn is_mentor(&self) -> bool {
        matches!(self, Role::Mentor)
    }
}
