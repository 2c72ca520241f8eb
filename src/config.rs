use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "ClinicScheduler";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP bind address for the scheduling API.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default look-ahead window for the "upcoming" list, in days.
pub const DEFAULT_UPCOMING_DAYS: u32 = 7;

const ENV_DB_PATH: &str = "CLINIC_DB_PATH";
const ENV_BIND_ADDR: &str = "CLINIC_BIND_ADDR";
const ENV_UPCOMING_DAYS: &str = "CLINIC_UPCOMING_DAYS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Cannot determine home directory")]
    NoHomeDir,
}

/// Get the application data directory
/// ~/ClinicScheduler/ on all platforms
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(APP_NAME))
}

/// Default location of the appointment database.
pub fn default_db_path() -> Result<PathBuf, ConfigError> {
    Ok(app_data_dir()?.join("database").join("appointments.db"))
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "clinic_scheduler_lib=info,tower_http=info"
}

/// Runtime settings, read from the environment with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub upcoming_days: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build settings from an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup(ENV_DB_PATH) {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };

        let bind_raw = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                var: ENV_BIND_ADDR,
                value: bind_raw.clone(),
            })?;

        let upcoming_days = match lookup(ENV_UPCOMING_DAYS) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|days| *days > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: ENV_UPCOMING_DAYS,
                    value: raw,
                })?,
            None => DEFAULT_UPCOMING_DAYS,
        };

        Ok(Self {
            db_path,
            bind_addr,
            upcoming_days,
        })
    }
}
