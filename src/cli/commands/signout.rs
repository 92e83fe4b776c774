use crate::cli::commands::{confirm, open_coordinator};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use tracing::warn;

/// Handle the `sign-out-all` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::SignOutAll { yes } = cmd else {
        return Ok(());
    };

    let coordinator = open_coordinator(cfg, true)?;
    if !coordinator.any_signed_in() {
        info("No one is signed in.");
        return Ok(());
    }

    let assume_yes = *yes;
    let coordinator = coordinator.with_all_out_confirmation(move || {
        assume_yes
            || confirm("Sign everyone out now?").unwrap_or_else(|e| {
                warn!(error = %e, "could not read the confirmation");
                false
            })
    });

    match coordinator.sign_all_out()? {
        Some(count) => {
            coordinator.commit()?;
            success(format!("Signed out {count} people"));
        }
        None => warning("Sign everyone out command cancelled"),
    }

    Ok(())
}
