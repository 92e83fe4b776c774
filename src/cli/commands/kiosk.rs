use crate::cli::commands::open_coordinator;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::clock::ClockThread;
use crate::core::scan::SCAN_TERMINATOR;
use crate::core::source::{BarcodeSource, LineSource, ScanRead};
use crate::errors::AppResult;
use crate::ui::messages::{error, info, is_yes, prompt, scan_status, success};
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{info as log_info, warn};

const ANSWER_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle the `kiosk` command
///
/// Reads one scan per line from stdin until it closes. Status changes are
/// printed as they happen; the clock thread drives the timeouts and the
/// periodic commit.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Kiosk { no_summary } = cmd else {
        return Ok(());
    };

    let source = LineSource::spawn(io::BufReader::new(io::stdin()));
    let answers = source.clone();
    let last_seq = Arc::new(Mutex::new(0u64));
    let seen = Arc::clone(&last_seq);

    let coordinator = open_coordinator(cfg, true)?
        .with_all_out_confirmation(move || {
            prompt("Sign everyone out now?");
            answers
                .read_answer(ANSWER_TIMEOUT)
                .map(|a| is_yes(&a))
                .unwrap_or(false)
        })
        .with_observer(move |snapshot| {
            let mut last = seen.lock().unwrap_or_else(PoisonError::into_inner);
            if snapshot.status_seq != *last {
                if !snapshot.status.is_empty() {
                    scan_status(&snapshot.status);
                }
                *last = snapshot.status_seq;
            }
        });
    let coordinator = Arc::new(coordinator);

    let snapshot = coordinator.snapshot();
    info(format!(
        "Kiosk ready: {} signed in, {} people on file",
        snapshot.signed_in.len(),
        coordinator.roster_at(snapshot.taken_at).len()
    ));
    if let Some(days) = snapshot.days_until_ship {
        info(format!("{days} days until ship"));
    }
    log_info!(ledger = %cfg.data_path().display(), "kiosk started");

    let clock = ClockThread::start(
        Arc::clone(&coordinator),
        Duration::from_millis(cfg.tick_interval_ms),
        Duration::from_secs(cfg.commit_interval_secs),
    );

    let mut reader = source;
    let poll = Duration::from_millis(cfg.tick_interval_ms);
    loop {
        match reader.next_scan(poll) {
            Ok(ScanRead::Scan(line)) => {
                let mut raw = line;
                raw.push(SCAN_TERMINATOR);
                if let Err(e) = coordinator.handle_input(&raw) {
                    warn!(error = %e, "scan could not be applied");
                    error(e);
                }
            }
            Ok(ScanRead::NoScan) => {}
            Ok(ScanRead::Closed) => break,
            Err(e) => {
                error(&e);
                break;
            }
        }
    }

    clock.stop();
    coordinator.commit()?;

    if cfg.summary_on_exit && !*no_summary {
        let files = coordinator.create_summary_files(&cfg.output_path())?;
        success(format!(
            "{} summary file(s) written to {}",
            files.len(),
            cfg.output_path().display()
        ));
    }

    log_info!("kiosk stopped");
    Ok(())
}
