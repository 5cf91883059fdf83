//! `retag` command line entry point.
//!
//! # Responsibility
//! - Turn flags/environment into a validated `RetagConfig`.
//! - Read the whole change set before opening the database.
//! - Hand off to the orchestrator and map fatal errors to a failing exit code.

use clap::Parser;
use log::{error, info};
use retag_core::change_set;
use retag_core::db::{open_db, open_db_read_only};
use retag_core::{
    default_log_level, init_logging_with_stdout, resolve_audit_author, PublicationRegistrar,
    RetagConfig, RetagError, RetagOrchestrator, RetagResult, RetagStores, RunReport,
    SqliteEditionRepository, SqliteOutbox, SqliteRemarkRepository, SqliteTaggingRepository,
    SqliteUserRepository, DEFAULT_AUDIT_AUTHOR_EMAIL,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Bulk-replace topic taggings listed in a change-set table.
#[derive(Debug, Parser)]
#[command(name = "retag", version)]
struct Args {
    /// Table with `remove_topic` and `add_topic` columns.
    #[arg(env = "RETAG_INPUT")]
    input: PathBuf,

    /// SQLite database holding editions and taggings.
    #[arg(long, env = "RETAG_DATABASE", default_value = "retag.db")]
    database: PathBuf,

    /// Account that editorial remarks are attributed to.
    #[arg(long, env = "RETAG_AUTHOR_EMAIL", default_value = DEFAULT_AUDIT_AUTHOR_EMAIL)]
    author_email: String,

    /// trace|debug|info|warn|error; defaults by build mode.
    #[arg(long, env = "RETAG_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rotating log files; defaults to `./log`.
    #[arg(long, env = "RETAG_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Resolve and report counts without changing anything; the database
    /// must already exist at the current schema revision.
    #[arg(long, env = "RETAG_DRY_RUN")]
    dry_run: bool,
}

impl Args {
    fn into_config(self) -> RetagResult<RetagConfig> {
        let log_dir = match self.log_dir {
            Some(dir) => dir,
            None => std::env::current_dir()
                .map_err(|err| {
                    RetagError::Configuration(format!("cannot resolve working directory: {err}"))
                })?
                .join("log"),
        };
        let mut config = RetagConfig::new(self.input, self.database, log_dir);
        config.audit_author_email = self.author_email;
        config.log_level = self
            .log_level
            .unwrap_or_else(|| default_log_level().to_string());
        config.dry_run = self.dry_run;
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("retag: {err}");
            return ExitCode::FAILURE;
        }
    };

    let log_dir = config.log_dir.to_string_lossy().into_owned();
    if let Err(err) = init_logging_with_stdout(&config.log_level, &log_dir) {
        eprintln!("retag: {err}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(report) => {
            info!(
                "event=cli_exit module=cli status=ok run_id={} instructions={} mutated={} failures={}",
                report.run_id,
                report.instructions.len(),
                report.mutated(),
                report.failures()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("retag: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &RetagConfig) -> RetagResult<RunReport> {
    let instructions = change_set::read(&config.input_path)?;
    let conn = if config.dry_run {
        open_db_read_only(&config.database_path)?
    } else {
        open_db(&config.database_path)?
    };

    let users = SqliteUserRepository::new(&conn);
    let author = resolve_audit_author(&users, &config.audit_author_email)?;

    let taggings = SqliteTaggingRepository::new(&conn);
    let editions = SqliteEditionRepository::new(&conn);
    let remarks = SqliteRemarkRepository::new(&conn);
    let outbox = SqliteOutbox::new(&conn);

    let stores = RetagStores {
        taggings: &taggings,
        editions: &editions,
        remarks: &remarks,
    };
    let registrar = PublicationRegistrar::new(&outbox, &outbox, &outbox);
    let orchestrator =
        RetagOrchestrator::new(stores, registrar, author).with_dry_run(config.dry_run);
    orchestrator.run(&instructions)
}
