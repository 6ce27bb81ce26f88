//! Command-line entry point for the attendance store.
//!
//! # Responsibility
//! - Stand in for the request layer: resolve config, open the store, dispatch
//!   one request, print the JSON response.
//! - Map client faults to exit code 2 and server faults to exit code 1.

use attendance_core::db::{open_db, DbError};
use attendance_core::{
    default_roster, init_from_config, AppConfig, AttendanceService, MarkRequest, MarkResponse,
    ReportService, RepoError, RosterQuery, RosterRepository, RosterRole, ServiceError,
    SqliteRecordRepository, SqliteRosterRepository,
};
use clap::{Parser, Subcommand};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;

const CLIENT_FAULT_EXIT: u8 = 2;
const SERVER_FAULT_EXIT: u8 = 1;

#[derive(Debug, Parser)]
#[command(name = "attendance_cli")]
#[command(about = "Record daily attendance and print monthly reports as JSON")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// Open the store and seed the default roster when it is empty.
    Init,
    /// Mark one day for a roster student.
    Mark {
        student_id: String,
        /// Day to mark, `YYYY-MM-DD`.
        date: String,
        /// present, absent or leave.
        status: String,
    },
    /// Day grid of the current month for one student.
    CurrentMonth { student_id: String },
    /// One student's history grouped by month.
    History { student_id: String },
    /// Every roster student's summary for one month.
    AllStudents {
        /// 1-based month; defaults to the current month.
        #[arg(long)]
        month: Option<u32>,
        /// Defaults to the current year.
        #[arg(long)]
        year: Option<i32>,
    },
    Ping,
    Version,
}

#[derive(Debug)]
enum CliError {
    Db(DbError),
    Repo(RepoError),
    Service(ServiceError),
    Json(serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Service(err) if err.is_client_fault() => CLIENT_FAULT_EXIT,
            _ => SERVER_FAULT_EXIT,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "store open failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "response encoding failed: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(parse_exit_code(&err));
        }
    };

    let config = AppConfig::from_env();
    if let Err(err) = init_from_config(&config) {
        eprintln!("warning: file logging disabled: {err}");
    }

    match run(&config, cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

/// `--help` and `--version` exit 0; argument errors are client faults.
fn parse_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        CLIENT_FAULT_EXIT
    } else {
        0
    }
}

fn run(config: &AppConfig, command: Command) -> Result<String, CliError> {
    let open = || open_store(config);
    let output = match command {
        Command::Ping => serde_json::json!(attendance_core::ping()),
        Command::Version => serde_json::json!(attendance_core::core_version()),
        Command::Init => {
            let conn = open()?;
            let roster = SqliteRosterRepository::try_new(&conn)?;
            serde_json::json!({
                "dbPath": config.db_path.display().to_string(),
                "students": roster.list_members(RosterRole::Student)?.len(),
                "teachers": roster.list_members(RosterRole::Teacher)?.len(),
            })
        }
        Command::Mark {
            student_id,
            date,
            status,
        } => {
            let conn = open()?;
            let roster = SqliteRosterRepository::try_new(&conn)?;
            // The roster name plays the role of the authenticated caller's name.
            let student = roster
                .find_member(RosterRole::Student, &student_id)?
                .ok_or_else(|| ServiceError::not_found("student", student_id.as_str()))?;
            let service = AttendanceService::new(SqliteRecordRepository::try_new(&conn)?, roster);
            let outcome = service.mark_attendance(
                &student.id,
                &student.name,
                &MarkRequest::new(date, status),
            )?;
            serde_json::to_value(MarkResponse::from(outcome))?
        }
        Command::CurrentMonth { student_id } => {
            let conn = open()?;
            let service = reports(&conn)?;
            serde_json::to_value(service.current_month(&student_id)?)?
        }
        Command::History { student_id } => {
            let conn = open()?;
            let service = reports(&conn)?;
            serde_json::to_value(service.student_history(&student_id)?)?
        }
        Command::AllStudents { month, year } => {
            let conn = open()?;
            let service = reports(&conn)?;
            serde_json::to_value(service.all_students(&RosterQuery { month, year })?)?
        }
    };

    Ok(serde_json::to_string_pretty(&output)?)
}

fn open_store(config: &AppConfig) -> Result<Connection, CliError> {
    let conn = open_db(&config.db_path)?;
    let seeded = SqliteRosterRepository::try_new(&conn)?.seed_if_empty(&default_roster())?;
    if seeded {
        info!("event=roster_seed module=cli status=ok");
    }
    Ok(conn)
}

fn reports(
    conn: &Connection,
) -> Result<ReportService<SqliteRecordRepository<'_>, SqliteRosterRepository<'_>>, CliError> {
    Ok(ReportService::new(
        SqliteRecordRepository::try_new(conn)?,
        SqliteRosterRepository::try_new(conn)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::{parse_exit_code, run, Cli, Command};
    use attendance_core::AppConfig;
    use clap::error::ErrorKind;
    use clap::{CommandFactory, Parser};

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("attendance_cli").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    fn temp_config(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            db_path: dir.join("attendance.db"),
            log_level: "info".to_string(),
            log_dir: dir.join("logs"),
        }
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_mark_command() {
        let command = parse(&["mark", "s1", "2025-03-05", "present"]).unwrap();
        assert_eq!(
            command,
            Command::Mark {
                student_id: "s1".to_string(),
                date: "2025-03-05".to_string(),
                status: "present".to_string(),
            }
        );
    }

    #[test]
    fn parse_all_students_with_optional_period() {
        let command = parse(&["all-students", "--month", "6", "--year", "2025"]).unwrap();
        assert_eq!(
            command,
            Command::AllStudents {
                month: Some(6),
                year: Some(2025),
            }
        );
        assert_eq!(
            parse(&["all-students"]).unwrap(),
            Command::AllStudents {
                month: None,
                year: None,
            }
        );
    }

    #[test]
    fn argument_errors_are_client_faults() {
        let err = parse(&["mark", "s1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(parse_exit_code(&err), 2);

        let err = parse(&["teleport"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        assert_eq!(parse_exit_code(&err), 2);

        let err = parse(&["all-students", "--month", "june"]).unwrap_err();
        assert_eq!(parse_exit_code(&err), 2);

        let err = parse(&[]).unwrap_err();
        assert_eq!(parse_exit_code(&err), 2);
    }

    #[test]
    fn help_and_version_flags_exit_cleanly() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse_exit_code(&err), 0);

        let err = parse(&["--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        assert_eq!(parse_exit_code(&err), 0);
    }

    #[test]
    fn mark_then_history_round_trip_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(dir.path());

        let marked = run(
            &config,
            parse(&["mark", "s1", "2025-03-05", "present"]).unwrap(),
        )
        .unwrap();
        assert!(marked.contains("\"created\": true"));

        let history = run(&config, parse(&["history", "s1"]).unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&history).unwrap();
        assert_eq!(value[0]["present"], 1);
        assert_eq!(value[0]["records"][0]["studentName"], "Student One");
    }

    #[test]
    fn client_and_server_faults_map_to_distinct_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(dir.path());

        let err = run(
            &config,
            parse(&["mark", "ghost", "2025-03-05", "present"]).unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = run(
            &config,
            parse(&["mark", "s1", "2025-03-05", "late"]).unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = run(
            &config,
            parse(&["all-students", "--month", "6", "--year", "300000"]).unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let broken = AppConfig {
            db_path: dir.path().join("missing-dir").join("attendance.db"),
            ..config
        };
        let err = run(&broken, parse(&["history", "s1"]).unwrap()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
