use crate::core::coordinator::SessionCoordinator;
use crate::ui::messages::error;
use crate::utils::time::now;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error as log_error};

/// Background thread that drives the coordinator's timed events and the
/// periodic commit.
pub struct ClockThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ClockThread {
    pub fn start(coordinator: Arc<SessionCoordinator>, tick: Duration, commit_every: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let mut last_commit = Instant::now();
            while !flag.load(Ordering::Relaxed) {
                thread::sleep(tick);
                coordinator.on_clock_tick(now());

                if last_commit.elapsed() >= commit_every {
                    match coordinator.commit() {
                        Ok(written) => debug!(written, "periodic commit"),
                        Err(e) => {
                            log_error!(error = %e, "periodic commit failed");
                            error(format!("Could not save the sign-in ledger: {e}"));
                        }
                    }
                    last_commit = Instant::now();
                }
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stop ticking and wait for the thread to finish.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log_error!("clock thread panicked");
        }
    }
}
