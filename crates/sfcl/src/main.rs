mod args;
mod cli;
mod commands;
mod exit;
mod logging;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run(std::env::args().collect()) {
        Ok(exit) => exit.report(),
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(source) = e.source() {
                eprintln!("Caused by: {source}");
            }
            ExitCode::FAILURE
        }
    }
}
