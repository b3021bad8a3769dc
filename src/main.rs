//! `brewfiles` binary: parse arguments, set up logging and signal handling,
//! run the command, and map the outcome to an exit status.
use std::process::ExitCode;

use brewfiles_cli::backend::BrewBackend;
use brewfiles_cli::cli::{Cli, VERSION};
use brewfiles_cli::commands::{self, Runtime};
use brewfiles_cli::confirm;
use brewfiles_cli::error::ReconcileError;
use brewfiles_cli::exec::SystemExecutor;
use brewfiles_cli::lifecycle::{self, EphemeralFiles};
use brewfiles_cli::logging::{self, Logger, Verbosity};
use chrono::Local;
use clap::Parser;

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let started = Local::now();

    let log_file = logging::log_file_path(started);
    logging::init_subscriber(
        Verbosity::from_flags(args.quiet, args.verbose),
        log_file.as_deref(),
    );
    let log = Logger::new(log_file);
    log.debug(&format!("brewfiles {VERSION}"));

    let files = EphemeralFiles::new();
    if let Err(e) = lifecycle::install_signal_handler(files.clone()) {
        log.warn(&format!("{e:#}"));
    }

    let executor = SystemExecutor;
    let backend = BrewBackend::new(&executor);
    let mut gate = confirm::terminal();
    let runtime = Runtime {
        backend: &backend,
        gate: &mut gate,
        log: &log,
        files: &files,
        started,
    };

    let status = match commands::run(&args, runtime) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e)
            if e.downcast_ref::<ReconcileError>()
                .is_some_and(ReconcileError::is_cancellation) =>
        {
            log.warn("cancelled; nothing was removed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    };
    log.print_log_location();
    status
}
