use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use std::path::Path;

/// Handle the `init` command
///
/// This creates:
///  - the configuration file (kept if present, unless --force)
///  - an empty ledger file (an existing one is never touched)
///  - the summary output folder
pub fn handle(cmd: &Commands, cfg: &Config, config_path: &Path) -> AppResult<()> {
    if let Commands::Init { force } = cmd {
        if config_path.exists() && !*force {
            warning(format!(
                "Configuration already exists at {} (use --force to overwrite)",
                config_path.display()
            ));
            cfg.init_storage()?;
        } else {
            cfg.init_all(config_path)?;
        }

        info(format!("Config file : {}", config_path.display()));
        info(format!("Ledger      : {}", cfg.data_path().display()));
        info(format!("Summaries   : {}", cfg.output_path().display()));
        success("scanclock initialization completed");
    }

    Ok(())
}
