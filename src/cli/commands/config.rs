use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::config::ConfigLogic;
use crate::errors::AppResult;
use crate::ui::messages::info;
use std::path::Path;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config, config_path: &Path) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        edit_config,
        editor,
    } = cmd
    {
        if *print_config {
            info(format!("Configuration ({}):\n", config_path.display()));
            println!("{}", ConfigLogic::render(cfg)?);
        }

        if *edit_config {
            ConfigLogic::edit(config_path, editor)?;
        }
    }

    Ok(())
}
