//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Blank values fall back to defaults.
//! - Resolution never fails; validation of the values happens where they are used.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "ATTENDANCE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "ATTENDANCE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "ATTENDANCE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "attendance.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "attendance-logs";

/// Store and logging settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        Self {
            db_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: value(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME)),
        }
    }
}
