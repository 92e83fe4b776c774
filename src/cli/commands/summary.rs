use crate::cli::commands::open_coordinator;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::path::expand_tilde;

/// Handle the `summary` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Summary { out } = cmd {
        let dir = match out {
            Some(dir) => expand_tilde(dir),
            None => cfg.output_path(),
        };

        let coordinator = open_coordinator(cfg, false)?;
        let files = coordinator.create_summary_files(&dir)?;

        if files.is_empty() {
            info(format!(
                "No student entries since kickoff ({}); nothing written",
                cfg.kickoff_date()
            ));
        } else {
            for file in &files {
                info(file.display());
            }
            success(format!("{} summary file(s) written", files.len()));
        }
    }

    Ok(())
}
