use crate::errors::{AppError, AppResult};
use crate::utils::date::{default_kickoff, default_ship, today};
use crate::utils::path::{expand_tilde, resolve_beside};
use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Kiosk configuration, read once at startup and passed explicitly to
/// everything that needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_output_folder")]
    pub output_folder: String,
    #[serde(default = "default_backup_folder")]
    pub backup_folder: String,
    #[serde(default = "default_max_backups")]
    pub max_backup_files: usize,
    #[serde(default)]
    pub compress_backups: bool,

    /// First day of the season (weeks are counted from here)
    #[serde(default)]
    pub kickoff: Option<NaiveDate>,
    /// Day the robot ships
    #[serde(default)]
    pub ship: Option<NaiveDate>,
    #[serde(default = "default_season_weeks")]
    pub season_weeks: u32,

    #[serde(default = "default_scan_in_timeout")]
    pub scan_in_timeout_secs: u64,
    #[serde(default = "default_scan_reset")]
    pub scan_reset_secs: u64,
    #[serde(default = "default_clear_status")]
    pub clear_status_secs: u64,
    #[serde(default = "default_total_time_update")]
    pub total_time_update_secs: u64,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_commit_interval")]
    pub commit_interval_secs: u64,

    #[serde(default = "default_true")]
    pub summary_on_exit: bool,
    #[serde(default = "default_true")]
    pub show_time_until_ship: bool,
}

fn default_data_file() -> String {
    Config::config_dir()
        .join("ScanData.xml")
        .to_string_lossy()
        .to_string()
}
fn default_output_folder() -> String {
    Config::config_dir().to_string_lossy().to_string()
}
fn default_backup_folder() -> String {
    "Backup".to_string()
}
fn default_max_backups() -> usize {
    30
}
fn default_season_weeks() -> u32 {
    6
}
fn default_scan_in_timeout() -> u64 {
    10
}
fn default_scan_reset() -> u64 {
    3
}
fn default_clear_status() -> u64 {
    60
}
fn default_total_time_update() -> u64 {
    300
}
fn default_tick_interval() -> u64 {
    200
}
fn default_commit_interval() -> u64 {
    900
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            output_folder: default_output_folder(),
            backup_folder: default_backup_folder(),
            max_backup_files: default_max_backups(),
            compress_backups: false,
            kickoff: None,
            ship: None,
            season_weeks: default_season_weeks(),
            scan_in_timeout_secs: default_scan_in_timeout(),
            scan_reset_secs: default_scan_reset(),
            clear_status_secs: default_clear_status(),
            total_time_update_secs: default_total_time_update(),
            tick_interval_ms: default_tick_interval(),
            commit_interval_secs: default_commit_interval(),
            summary_on_exit: true,
            show_time_until_ship: true,
        }
    }
}

/// Timer windows and season dates used by the session coordinator.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub scan_in_timeout: TimeDelta,
    pub scan_reset: TimeDelta,
    pub clear_status: TimeDelta,
    pub total_time_update: TimeDelta,
    pub kickoff: NaiveDate,
    pub ship: Option<NaiveDate>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings::from(&Config::default())
    }
}

/// Longest accepted timer window: one year.
pub const MAX_WINDOW_SECS: u64 = 86_400 * 365;

/// Seconds to a timer window, capped at [`MAX_WINDOW_SECS`].
fn window(secs: u64) -> TimeDelta {
    i64::try_from(secs.min(MAX_WINDOW_SECS))
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or_else(TimeDelta::zero)
}

impl From<&Config> for SessionSettings {
    fn from(cfg: &Config) -> Self {
        let kickoff = cfg.kickoff_date();
        Self {
            scan_in_timeout: window(cfg.scan_in_timeout_secs),
            scan_reset: window(cfg.scan_reset_secs),
            clear_status: window(cfg.clear_status_secs),
            total_time_update: window(cfg.total_time_update_secs),
            kickoff,
            ship: cfg.show_time_until_ship.then(|| cfg.ship_date()),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("scanclock")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".scanclock")
        }
    }

    /// Return the full path of the default config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("scanclock.conf")
    }

    /// Load configuration from `path`, or return defaults if the file is missing
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let cfg = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| AppError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
            serde_yaml::from_str::<Config>(&content)
                .map_err(|e| AppError::ConfigLoad(format!("{}: {}", path.display(), e)))?
        } else {
            Config::default()
        };

        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the default location
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    /// Write the configuration as YAML, creating the parent folder
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(|_| AppError::ConfigSave)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        let windows = [
            ("scan_in_timeout_secs", self.scan_in_timeout_secs, MAX_WINDOW_SECS),
            ("scan_reset_secs", self.scan_reset_secs, MAX_WINDOW_SECS),
            ("clear_status_secs", self.clear_status_secs, MAX_WINDOW_SECS),
            ("total_time_update_secs", self.total_time_update_secs, MAX_WINDOW_SECS),
            ("tick_interval_ms", self.tick_interval_ms, MAX_WINDOW_SECS * 1000),
            ("commit_interval_secs", self.commit_interval_secs, MAX_WINDOW_SECS),
        ];
        for (name, value, max) in windows {
            if value == 0 {
                return Err(AppError::Config(format!("{name} must be greater than zero")));
            }
            if value > max {
                return Err(AppError::Config(format!("{name} must be at most {max}")));
            }
        }

        if self.ship_date() < self.kickoff_date() {
            return Err(AppError::Config(format!(
                "ship date {} is before kickoff {}",
                self.ship_date(),
                self.kickoff_date()
            )));
        }

        Ok(())
    }

    /// Configured kickoff, or the first Saturday of January this year
    pub fn kickoff_date(&self) -> NaiveDate {
        self.kickoff
            .unwrap_or_else(|| default_kickoff(today().year()))
    }

    /// Configured ship date, or the Wednesday after `season_weeks` full weeks
    pub fn ship_date(&self) -> NaiveDate {
        self.ship
            .unwrap_or_else(|| default_ship(self.kickoff_date(), self.season_weeks))
    }

    pub fn data_path(&self) -> PathBuf {
        expand_tilde(&self.data_file)
    }

    pub fn output_path(&self) -> PathBuf {
        expand_tilde(&self.output_folder)
    }

    /// Backup folder, resolved next to the ledger file when relative
    pub fn backup_path(&self) -> PathBuf {
        resolve_beside(&self.data_path(), &self.backup_folder)
    }

    /// Create the configuration file and an empty ledger
    pub fn init_all(&self, config_path: &Path) -> AppResult<()> {
        self.save_to(config_path)?;
        self.init_storage()
    }

    /// Create the ledger (if missing) and the summary folder
    pub fn init_storage(&self) -> AppResult<()> {
        let data = self.data_path();
        if let Some(parent) = data.parent() {
            fs::create_dir_all(parent)?;
        }
        if !data.exists() {
            crate::store::xml::write_people(&data, &[])?;
        }
        fs::create_dir_all(self.output_path())?;

        Ok(())
    }
}
