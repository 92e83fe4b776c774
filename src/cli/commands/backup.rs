use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::{BackupPolicy, backup_file};
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup = cmd {
        let dest = backup_file(&cfg.data_path(), &BackupPolicy::from(cfg))?;
        success(format!("Backup created: {}", dest.display()));
    }

    Ok(())
}
