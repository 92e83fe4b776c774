//! Ledger persistence.

pub mod xml;

use crate::core::backup::{BackupPolicy, backup_file};
use crate::errors::AppResult;
use crate::models::Person;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the coordinator loads people from and commits them to.
pub trait LedgerStore: Send + Sync {
    fn load(&self) -> AppResult<Vec<Person>>;
    fn save(&self, people: &[&Person]) -> AppResult<()>;
}

/// The XML ledger file. Loading takes a backup copy first.
#[derive(Debug, Clone)]
pub struct XmlLedger {
    path: PathBuf,
    backup: Option<BackupPolicy>,
}

impl XmlLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: None,
        }
    }

    pub fn with_backup(mut self, policy: BackupPolicy) -> Self {
        self.backup = Some(policy);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for XmlLedger {
    fn load(&self) -> AppResult<Vec<Person>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no ledger file yet");
            return Ok(Vec::new());
        }

        if let Some(policy) = &self.backup {
            backup_file(&self.path, policy)?;
        }

        let people = xml::read_people(&self.path)?;
        info!(path = %self.path.display(), people = people.len(), "ledger loaded");
        Ok(people)
    }

    fn save(&self, people: &[&Person]) -> AppResult<()> {
        xml::write_people(&self.path, people)?;
        info!(path = %self.path.display(), "ledger saved");
        Ok(())
    }
}
