//! Diagnostic logging.
//!
//! Filter directives come from the `SCANCLOCK_LOG` environment variable
//! (e.g. `SCANCLOCK_LOG=debug` or `SCANCLOCK_LOG=scanclock::core=debug,warn`).
//! Without it only warnings and errors are shown, keeping kiosk output clean.
//! Logs go to stderr; the status lines on stdout are for people scanning.

use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "SCANCLOCK_LOG";

pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (tests calling run() repeatedly) keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
