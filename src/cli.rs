// src/cli.rs

use crate::models::LogOptions;
use clap::{ArgAction, Parser};

/// gms: per-command defaults for google-music-scripts.
///
/// Resolves the defaults configured for COMMAND in the settings file
/// (`[defaults]`, `[defaults.<command>]`, `[defaults.<alias>]`) and prints them as TOML.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The command to resolve defaults for (e.g. `upload`, or its alias `up`).
    pub command: String,

    /// Use the settings and log directory of this profile.
    #[arg(long, short)]
    pub username: Option<String>,

    /// Increase verbosity. Repeatable.
    #[arg(long, short, action = ArgAction::Count)]
    pub verbose: u8,

    /// Decrease verbosity. Repeatable.
    #[arg(long, short, action = ArgAction::Count)]
    pub quiet: u8,

    /// Let dependency log channels emit.
    #[arg(long)]
    pub debug: bool,

    /// Also log to a timestamped file.
    #[arg(long)]
    pub log: bool,

    /// Do not log to standard output.
    #[arg(long)]
    pub no_log_to_stdout: bool,
}

impl Cli {
    /// `-v` count minus `-q` count.
    pub fn verbosity_modifier(&self) -> i64 {
        i64::from(self.verbose) - i64::from(self.quiet)
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            modifier: self.verbosity_modifier(),
            debug: self.debug,
            log_to_stdout: !self.no_log_to_stdout,
            log_to_file: self.log,
            profile: self.username.clone(),
        }
    }
}
