/*
 * procsim - interactive front end for the process scheduling simulator
 *
 * Usage: procsim [-v]
 *
 *   -v, --verbose   log dispatches and queue transitions (Debug level)
 *
 * Commands are read from stdin one per line; logs go to stderr.
 */

mod command;
mod history;
mod shell;

use std::io;
use std::process::ExitCode;

use log::LevelFilter;
use procsim_kernel::{ArenaConfig, System, utils::logger};

use shell::Shell;

fn main() -> ExitCode {
    let verbose = std::env::args()
        .skip(1)
        .any(|arg| arg == "-v" || arg == "--verbose");
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    if let Err(err) = logger::init(level) {
        eprintln!("procsim: logger unavailable: {}", err);
    }

    let system = match System::new(ArenaConfig::default()) {
        Ok(system) => system,
        Err(err) => {
            log::error!("could not start simulation: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut shell = Shell::new(system);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match shell.run(stdin.lock(), &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("i/o error: {}", err);
            ExitCode::FAILURE
        }
    }
}
