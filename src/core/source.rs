//! Input sources that deliver completed scans to the kiosk loop.

use crate::errors::AppResult;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanRead {
    Scan(String),
    /// Nothing arrived within the wait; try again
    NoScan,
    /// The source is exhausted
    Closed,
}

/// Anything that produces barcode payloads: a keyboard-wedge scanner, a
/// camera decoder, a test script. A wait that times out is `NoScan`, not an
/// error.
pub trait BarcodeSource {
    fn next_scan(&mut self, timeout: Duration) -> AppResult<ScanRead>;
}

/// Lines read on a background thread and handed over through a channel.
#[derive(Clone)]
pub struct LineSource {
    rx: Arc<Mutex<Receiver<String>>>,
}

impl LineSource {
    /// Start reading `reader` line by line on its own thread.
    pub fn spawn<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "scan input stopped");
                        break;
                    }
                }
            }
            debug!("scan input closed");
        });

        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Read one answer line, used for operator prompts.
    pub fn read_answer(&self, timeout: Duration) -> Option<String> {
        let rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        rx.recv_timeout(timeout).ok()
    }
}

impl BarcodeSource for LineSource {
    fn next_scan(&mut self, timeout: Duration) -> AppResult<ScanRead> {
        let rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        match rx.recv_timeout(timeout) {
            Ok(line) => Ok(ScanRead::Scan(line)),
            Err(RecvTimeoutError::Timeout) => Ok(ScanRead::NoScan),
            Err(RecvTimeoutError::Disconnected) => Ok(ScanRead::Closed),
        }
    }
}
