pub mod backup;
pub mod config;
pub mod init;
pub mod kiosk;
pub mod prune;
pub mod signout;
pub mod status;
pub mod summary;

use crate::config::{Config, SessionSettings};
use crate::core::backup::BackupPolicy;
use crate::core::coordinator::SessionCoordinator;
use crate::errors::AppResult;
use crate::store::XmlLedger;
use std::io;

/// Open the ledger named by the configuration. Commands that change the
/// ledger take a backup copy first.
pub(crate) fn open_coordinator(cfg: &Config, with_backup: bool) -> AppResult<SessionCoordinator> {
    let mut ledger = XmlLedger::new(cfg.data_path());
    if with_backup {
        ledger = ledger.with_backup(BackupPolicy::from(cfg));
    }
    SessionCoordinator::open(SessionSettings::from(cfg), Box::new(ledger))
}

/// Ask a yes/no question on the terminal.
pub(crate) fn confirm(question: &str) -> AppResult<bool> {
    crate::ui::messages::prompt(question);
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(crate::ui::messages::is_yes(&answer))
}
