// src/core/log_planner.rs

//! Derives the logging setup from a single verbosity knob.
//!
//! The planner only decides *what* to attach. Applying a [`SinkPlan`] to the `log`
//! façade is the job of [`crate::system::logging::LoggingState`].

use crate::constants::{
    BASE_VERBOSITY, DEPENDENCY_CHANNELS, LOG_FILE_EXTENSION, LOG_FILE_TIMESTAMP_FORMAT,
    LOG_LINE_TIMESTAMP_FORMAT, VERBOSITY_THRESHOLDS,
};
use crate::core::paths::AppPaths;
use crate::models::{LogOptions, Severity, SinkDestination, SinkPlan, SinkSpec};
use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Highest index into [`VERBOSITY_THRESHOLDS`].
const MAX_VERBOSITY: i64 = 7;

/// Failures of preparing or applying a logging setup.
#[derive(Error, Debug)]
pub enum LogSetupError {
    /// The log directory could not be created.
    #[error("Could not create log directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The log file could not be opened for appending.
    #[error("Could not open log file '{path}': {source}")]
    OpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Another logger already owns the `log` façade.
    #[error("A logger is already installed for this process.")]
    AlreadyInstalled,
}

/// Maps a verbosity modifier to a severity threshold.
///
/// The modifier is added to the base verbosity and clamped to the table, so any
/// `i64` is accepted: `-100` yields the quietest threshold (50), `100` the loudest (5).
pub fn verbosity_threshold(modifier: i64) -> Severity {
    let verbosity = BASE_VERBOSITY
        .saturating_add(modifier)
        .clamp(0, MAX_VERBOSITY);
    usize::try_from(verbosity)
        .ok()
        .and_then(|index| VERBOSITY_THRESHOLDS.get(index))
        .map_or(Severity::TRACE, |value| Severity::new(*value))
}

/// Creates the log directory for `profile` if needed and returns it.
pub fn ensure_log_dir(paths: &AppPaths, profile: Option<&str>) -> Result<PathBuf, LogSetupError> {
    let log_dir = paths.log_dir(profile);
    fs::create_dir_all(&log_dir).map_err(|source| LogSetupError::CreateDir {
        path: log_dir.display().to_string(),
        source,
    })?;
    Ok(log_dir)
}

/// The file name of a log started at `started`, e.g. `2024-01-02_03-04-05.log`.
pub fn log_file_name(started: &DateTime<Local>) -> String {
    format!(
        "{}.{}",
        started.format(LOG_FILE_TIMESTAMP_FORMAT),
        LOG_FILE_EXTENSION
    )
}

/// Plans the sinks for `options`, naming a log file after the current local time.
pub fn plan_sinks(options: &LogOptions, paths: &AppPaths) -> Result<SinkPlan, LogSetupError> {
    plan_sinks_at(options, paths, Local::now())
}

/// Plans the sinks for `options` as if invoked at `now`.
///
/// Standard output comes before the file when both are requested. Requesting a file
/// creates the log directory; the file itself is only opened when the plan is applied.
pub fn plan_sinks_at(
    options: &LogOptions,
    paths: &AppPaths,
    now: DateTime<Local>,
) -> Result<SinkPlan, LogSetupError> {
    let threshold = verbosity_threshold(options.modifier);
    let mut sinks = Vec::new();

    if options.log_to_stdout {
        sinks.push(SinkSpec {
            destination: SinkDestination::Stdout,
            threshold,
            timestamp_format: LOG_LINE_TIMESTAMP_FORMAT,
            styled: true,
        });
    }

    if options.log_to_file {
        let log_dir = ensure_log_dir(paths, options.profile.as_deref())?;
        sinks.push(SinkSpec {
            destination: SinkDestination::File(log_dir.join(log_file_name(&now))),
            threshold,
            timestamp_format: LOG_LINE_TIMESTAMP_FORMAT,
            styled: false,
        });
    }

    let enabled_channels = if options.debug {
        DEPENDENCY_CHANNELS.to_vec()
    } else {
        Vec::new()
    };

    Ok(SinkPlan {
        threshold,
        sinks,
        enabled_channels,
    })
}
