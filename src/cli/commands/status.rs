use crate::cli::commands::open_coordinator;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::info;
use crate::utils::mins2readable;
use crate::utils::table::Table;
use crate::utils::time::{format_hm, now};

/// Handle the `status` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Status { all, json } = cmd else {
        return Ok(());
    };

    let coordinator = open_coordinator(cfg, false)?;
    let at = now();
    let snapshot = coordinator.snapshot_at(at);

    if *json {
        let out = if *all {
            serde_json::to_string_pretty(&coordinator.roster_at(at))
        } else {
            serde_json::to_string_pretty(&snapshot)
        }
        .map_err(|e| AppError::Other(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    if *all {
        let mut table = Table::new(["Name", "Role", "In", "Entries", "Since kickoff"]);
        for line in coordinator.roster_at(at) {
            table.add_row(vec![
                line.full_name,
                line.role.as_str().to_string(),
                if line.signed_in { "yes" } else { "" }.to_string(),
                line.entries.to_string(),
                mins2readable(line.minutes_since_kickoff, true),
            ]);
        }
        if table.is_empty() {
            info("No one on file yet.");
        } else {
            print!("{}", table.render());
        }
    } else if snapshot.signed_in.is_empty() {
        info("No one is signed in.");
    } else {
        let mut table = Table::new(["Name", "Role", "In at"]);
        for person in &snapshot.signed_in {
            table.add_row(vec![
                person.full_name.clone(),
                person.role.as_str().to_string(),
                format_hm(person.time_in),
            ]);
        }
        print!("{}", table.render());
    }

    println!();
    info(format!(
        "Total since kickoff ({}): {}",
        cfg.kickoff_date(),
        mins2readable(snapshot.totals.total_minutes, false)
    ));
    if let Some(oldest) = snapshot.totals.oldest_scan {
        info(format!("Oldest entry: {}", oldest.format("%Y-%m-%d %H:%M")));
    }
    if let Some(days) = snapshot.days_until_ship {
        info(format!("{days} days until ship"));
    }

    Ok(())
}
