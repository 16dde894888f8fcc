use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

use crate::commands::{analyze::analyze, settings::show_settings};

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Analyze a detection cache and write the report as JSON.
    #[clap(name = "analyze")]
    Analyze {
        #[clap(short, long)]
        input: PathBuf,
        #[clap(short, long)]
        output: PathBuf,
    },

    /// Print the settings in use, writing the defaults if the settings file is missing.
    #[clap(name = "settings")]
    Settings {
        /// Overwrite the settings file with the defaults.
        #[clap(long, default_value = "false", action)]
        reset: bool,
    },
}

#[derive(Debug, Parser)]
#[command(name = "courtside")]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,

    #[clap(long, short = 'f', default_value = "courtside-settings.json")]
    pub settings_file: PathBuf,

    #[clap(long, default_value = "info")]
    pub log_level: String,

    /// Also write JSON logs to this file, or to a timestamped file in `logs/` with `auto`.
    #[clap(long)]
    pub log_file: Option<String>,
}

impl Cli {
    pub fn start(self) -> ExitCode {
        match self.command {
            Command::Analyze { input, output } => {
                match analyze(&self.settings_file, &input, &output) {
                    Ok(_) => ExitCode::SUCCESS,
                    Err(err) => {
                        tracing::error!("Error analyzing {}: {:#}", input.display(), err);
                        ExitCode::FAILURE
                    }
                }
            }
            Command::Settings { reset } => match show_settings(&self.settings_file, reset) {
                Ok(_) => ExitCode::SUCCESS,
                Err(err) => {
                    tracing::error!("Error loading settings: {:#}", err);
                    ExitCode::FAILURE
                }
            },
        }
    }
}
