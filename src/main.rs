//! procrastinate - natural-language todo list

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = procrastinate::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
