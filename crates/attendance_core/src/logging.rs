//! Rolling file logs for the attendance store.
//!
//! # Invariants
//! - One logger per process. `init_from_config` is idempotent for identical
//!   settings and rejects any other settings once a logger is active.
//! - Events carry ids, counts and durations. Student names stay out of logs.

use crate::config::AppConfig;
use crate::db::migrations::latest_version;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle,
    Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "attendance";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEPT_LOG_FILES: usize = 5;
const PANIC_SUMMARY_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: LevelFilter,
    dir: PathBuf,
}

impl LogSettings {
    fn from_config(config: &AppConfig) -> Result<Self, LoggingError> {
        let level = parse_level(&config.log_level)?;
        if !config.log_dir.is_absolute() {
            return Err(LoggingError::RelativeDirectory(config.log_dir.clone()));
        }
        Ok(Self {
            level,
            dir: config.log_dir.clone(),
        })
    }
}

impl Display for LogSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "level={} dir={}", self.level, self.dir.display())
    }
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    RelativeDirectory(PathBuf),
    /// A logger with different settings is already running.
    Conflict {
        active: String,
        requested: String,
    },
    CreateDirectory {
        dir: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error|off"
            ),
            Self::RelativeDirectory(dir) => {
                write!(f, "log directory must be absolute, got `{}`", dir.display())
            }
            Self::Conflict { active, requested } => write!(
                f,
                "logging already active with {active}; refusing {requested}"
            ),
            Self::CreateDirectory { dir, source } => write!(
                f,
                "cannot create log directory `{}`: {source}",
                dir.display()
            ),
            Self::Backend(err) => write!(f, "logger backend failed to start: {err}"),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FlexiLoggerError> for LoggingError {
    fn from(value: FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

/// Starts file logging with the level and directory from `config`.
///
/// # Errors
/// - `UnsupportedLevel` / `RelativeDirectory` for unusable settings.
/// - `Conflict` when a logger with other settings is already active.
/// - `CreateDirectory` / `Backend` when the logger cannot start.
pub fn init_from_config(config: &AppConfig) -> Result<(), LoggingError> {
    let requested = LogSettings::from_config(config)?;
    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(&requested))?;
    if active.settings != requested {
        return Err(LoggingError::Conflict {
            active: active.settings.to_string(),
            requested: requested.to_string(),
        });
    }
    Ok(())
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, LoggingError> {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized == "warning" {
        return Ok(LevelFilter::Warn);
    }
    normalized
        .parse::<LevelFilter>()
        .map_err(|_| LoggingError::UnsupportedLevel(raw.trim().to_string()))
}

fn start_logger(settings: &LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|source| LoggingError::CreateDirectory {
        dir: settings.dir.clone(),
        source,
    })?;

    let handle = Logger::with(LogSpecification::builder().default(settings.level).build())
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.clone())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEPT_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    install_panic_hook();
    info!(
        "event=app_start module=core status=ok version={} schema_version={} {}",
        env!("CARGO_PKG_VERSION"),
        latest_version(),
        settings
    );

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

// Runs at most once: only a successful `start_logger` reaches it.
fn install_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}", loc.file(), loc.line()),
        );
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            panic_summary(info.payload())
        );
        previous_hook(info);
    }));
}

/// Single-line, length-capped panic text. Payloads may echo request input.
fn panic_summary(payload: &(dyn Any + Send)) -> String {
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");

    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= PANIC_SUMMARY_CHARS {
        return flattened;
    }
    let mut capped: String = flattened.chars().take(PANIC_SUMMARY_CHARS).collect();
    capped.push_str("...");
    capped
}

#[cfg(test)]
mod tests {
    use super::{init_from_config, panic_summary, parse_level, LoggingError};
    use crate::config::AppConfig;
    use log::LevelFilter;
    use std::any::Any;
    use std::path::Path;

    fn config_at(log_dir: &Path, level: &str) -> AppConfig {
        AppConfig {
            db_path: log_dir.join("attendance.db"),
            log_level: level.to_string(),
            log_dir: log_dir.to_path_buf(),
        }
    }

    #[test]
    fn parse_level_accepts_case_and_warning_alias() {
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level(" warning ").unwrap(), LevelFilter::Warn);
        assert!(matches!(
            parse_level("loud"),
            Err(LoggingError::UnsupportedLevel(value)) if value == "loud"
        ));
    }

    #[test]
    fn relative_log_dir_is_rejected_before_starting() {
        let err = init_from_config(&config_at(Path::new("logs/dev"), "info")).unwrap_err();
        assert!(matches!(err, LoggingError::RelativeDirectory(_)));
    }

    #[test]
    fn panic_summary_is_single_line_and_capped() {
        let payload: Box<dyn Any + Send> = Box::new("student\nname\r\nleaked".to_string());
        assert_eq!(panic_summary(payload.as_ref()), "student name leaked");

        let long: Box<dyn Any + Send> = Box::new("x".repeat(500));
        let summary = panic_summary(long.as_ref());
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), 163);

        let opaque: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_summary(opaque.as_ref()), "non-string panic payload");
    }

    #[test]
    fn init_from_config_is_idempotent_and_rejects_other_settings() {
        let root = tempfile::tempdir().unwrap();
        let log_dir = root.path().join("nested").join("logs");
        let config = config_at(&log_dir, "info");

        init_from_config(&config).unwrap();
        init_from_config(&config).unwrap();
        assert!(log_dir.is_dir());

        let err = init_from_config(&config_at(&log_dir, "debug")).unwrap_err();
        assert!(matches!(err, LoggingError::Conflict { .. }));

        let other_dir = root.path().join("other");
        let err = init_from_config(&config_at(&other_dir, "info")).unwrap_err();
        assert!(matches!(err, LoggingError::Conflict { .. }));
        assert!(err.to_string().contains("refusing"));
    }
}
