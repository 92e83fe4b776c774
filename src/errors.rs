//! Unified application error type.
//! Every module (store, core, cli, config) returns AppError so that failures
//! reach the caller in one shape. Scan rejections and refused sign-ins are
//! NOT errors: they are reported as status strings by the coordinator.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Ledger file
    // ---------------------------
    #[error("Ledger file error: {0}")]
    Xml(String),

    #[error("Invalid timestamp in ledger: {0}")]
    InvalidTimestamp(String),

    #[error("Backup error: {0}")]
    Backup(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    // ---------------------------
    // Wiring errors
    // ---------------------------
    #[error("Required collaborator not configured: {0}")]
    MissingCollaborator(&'static str),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Report errors
    // ---------------------------
    #[error("Summary report error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
