use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod logging;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    // Keep the guard alive so the file appender is flushed on exit
    let _guard = match logging::setup(&cli.log_level, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Failed to set up logging: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    cli.start()
}
