use crate::cli::commands::{confirm, open_coordinator};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::utils::date::parse_date;

/// Handle the `prune` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Prune { before, yes } = cmd else {
        return Ok(());
    };

    let cutoff = parse_date(before).ok_or_else(|| AppError::InvalidDate(before.clone()))?;

    if !*yes && !confirm(&format!("Delete every entry before {cutoff}?"))? {
        warning("Prune cancelled");
        return Ok(());
    }

    let coordinator = open_coordinator(cfg, true)?;
    let removed = coordinator.prune(cutoff);

    if removed == 0 {
        info(format!("No entries before {cutoff}"));
        return Ok(());
    }

    coordinator.commit()?;
    success(format!("Removed {removed} entries before {cutoff}"));
    Ok(())
}
