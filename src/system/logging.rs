// src/system/logging.rs

use crate::constants::DEPENDENCY_CHANNELS;
use crate::core::log_planner::LogSetupError;
use crate::models::{Severity, SinkDestination, SinkPlan, SinkSpec};
use chrono::Local;
use env_logger::{Builder, Target, WriteStyle};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Log target prefix of this crate. Dependency channels are matched by prefix
/// (`google_music` would otherwise swallow `google_music_scripts`).
const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Logs a message at a numeric [`Severity`](crate::models::Severity).
///
/// The record is emitted at the severity's `log` level and carries the exact value
/// under the `severity` key, so sinks can tell `NORMAL` (25) from `INFO` (20).
///
/// ```
/// use google_music_scripts::{log_at, models::Severity};
/// log_at!(Severity::ACTION, "Uploaded {}", "song.mp3");
/// ```
#[macro_export]
macro_rules! log_at {
    ($severity:expr, $($arg:tt)+) => {{
        let severity: $crate::models::Severity = $severity;
        ::log::log!(severity.level(), severity = severity.value(); $($arg)+)
    }};
}

/// One output of the dispatcher: an `env_logger` formatter plus its numeric threshold.
struct Sink {
    logger: env_logger::Logger,
    threshold: Severity,
    to_file: bool,
}

impl Sink {
    fn log(&self, record: &Record<'_>) {
        if self.threshold.admits(record) {
            self.logger.log(record);
        }
    }
}

/// Fans every record out to the active sinks.
#[derive(Default)]
struct Dispatcher {
    sinks: RwLock<Vec<Sink>>,
}

impl Dispatcher {
    fn read(&self) -> RwLockReadGuard<'_, Vec<Sink>> {
        self.sinks.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Sink>> {
        self.sinks.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("sinks", &self.read().len())
            .finish()
    }
}

impl Log for Dispatcher {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.read().iter().any(|sink| sink.logger.enabled(metadata))
    }

    fn log(&self, record: &Record<'_>) {
        for sink in self.read().iter() {
            sink.log(record);
        }
    }

    fn flush(&self) {
        for sink in self.read().iter() {
            sink.logger.flush();
        }
    }
}

/// The handle registered with the `log` façade. It only forwards to the shared dispatcher.
struct GlobalLogger(Arc<Dispatcher>);

impl Log for GlobalLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.0.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        self.0.log(record);
    }

    fn flush(&self) {
        self.0.flush();
    }
}

/// Owns the active set of sinks.
///
/// Applying a plan replaces every sink at once; sinks never accumulate across calls.
#[derive(Debug, Clone)]
pub struct LoggingState {
    dispatcher: Arc<Dispatcher>,
    global: bool,
}

impl LoggingState {
    /// Registers a sink-less state as the process-wide logger.
    ///
    /// # Errors
    /// Returns `LogSetupError::AlreadyInstalled` if any logger is already registered.
    pub fn install() -> Result<Self, LogSetupError> {
        let dispatcher = Arc::new(Dispatcher::default());
        log::set_boxed_logger(Box::new(GlobalLogger(Arc::clone(&dispatcher))))
            .map_err(|_| LogSetupError::AlreadyInstalled)?;
        log::set_max_level(LevelFilter::Off);
        Ok(Self {
            dispatcher,
            global: true,
        })
    }

    /// A state that is not registered with the `log` façade. Records reach it only
    /// through [`LoggingState::logger`].
    pub fn detached() -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::default()),
            global: false,
        }
    }

    /// Swaps the active sinks for the ones described by `plan`.
    ///
    /// All sinks are built before anything is swapped, so on error the previous
    /// configuration stays in place. The log file location is announced on the
    /// new non-file sinks only, never inside the file itself.
    pub fn reconfigure(&self, plan: &SinkPlan) -> Result<(), LogSetupError> {
        let sinks = plan
            .sinks
            .iter()
            .map(|spec| build_sink(spec, &plan.enabled_channels))
            .collect::<Result<Vec<_>, _>>()?;
        let max_level = sinks
            .iter()
            .map(|sink| sink.logger.filter())
            .max()
            .unwrap_or(LevelFilter::Off);

        if let Some(path) = plan.file_path() {
            for sink in sinks.iter().filter(|sink| !sink.to_file) {
                sink.log(
                    &Record::builder()
                        .args(format_args!("Logging to file: {}", path.display()))
                        .level(Level::Info)
                        .target(module_path!())
                        .build(),
                );
                sink.logger.flush();
            }
        }

        *self.dispatcher.write() = sinks;
        if self.global {
            log::set_max_level(max_level);
        }
        Ok(())
    }

    /// Number of active sinks.
    pub fn sink_count(&self) -> usize {
        self.dispatcher.read().len()
    }

    /// The logger behind this state, for feeding records directly.
    pub fn logger(&self) -> &dyn Log {
        self.dispatcher.as_ref()
    }
}

fn build_sink(spec: &SinkSpec, enabled_channels: &[&str]) -> Result<Sink, LogSetupError> {
    let level = spec.threshold.level_filter();
    let mut builder = Builder::new();
    builder.filter_level(level);
    for channel in DEPENDENCY_CHANNELS
        .iter()
        .copied()
        .filter(|channel| !enabled_channels.contains(channel))
    {
        builder.filter_module(channel, LevelFilter::Off);
    }
    builder.filter_module(CRATE_TARGET, level);

    let timestamp_format = spec.timestamp_format;
    let styled = spec.styled;
    builder.format(move |buf, record| {
        let timestamp = Local::now().format(timestamp_format);
        if styled {
            let style = buf.default_level_style(record.level());
            writeln!(buf, "{style}[{timestamp}]{style:#} {}", record.args())
        } else {
            writeln!(buf, "[{timestamp}] {}", record.args())
        }
    });

    match &spec.destination {
        SinkDestination::Stdout => {
            builder.target(Target::Stdout).write_style(if styled {
                WriteStyle::Auto
            } else {
                WriteStyle::Never
            });
        }
        SinkDestination::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LogSetupError::OpenFile {
                    path: path.display().to_string(),
                    source,
                })?;
            builder
                .target(Target::Pipe(Box::new(file)))
                .write_style(WriteStyle::Never);
        }
    }

    Ok(Sink {
        logger: builder.build(),
        threshold: spec.threshold,
        to_file: matches!(spec.destination, SinkDestination::File(_)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SEVERITY_KEY;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn file_plan(path: &Path, threshold: Severity, enabled_channels: Vec<&'static str>) -> SinkPlan {
        SinkPlan {
            threshold,
            sinks: vec![SinkSpec {
                destination: SinkDestination::File(path.to_path_buf()),
                threshold,
                timestamp_format: "%Y-%m-%d %H:%M:%S",
                styled: false,
            }],
            enabled_channels,
        }
    }

    fn emit(state: &LoggingState, level: Level, target: &str, message: &str) {
        state.logger().log(
            &Record::builder()
                .args(format_args!("{message}"))
                .level(level)
                .target(target)
                .build(),
        );
        state.logger().flush();
    }

    fn emit_at(state: &LoggingState, severity: Severity, message: &str) {
        let kvs: &[(&str, u8)] = &[(SEVERITY_KEY, severity.value())];
        state.logger().log(
            &Record::builder()
                .args(format_args!("{message}"))
                .level(severity.level())
                .target("google_music_scripts::commands")
                .key_values(&kvs)
                .build(),
        );
        state.logger().flush();
    }

    #[test]
    fn test_file_sink_writes_bracketed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        let state = LoggingState::detached();
        state
            .reconfigure(&file_plan(&path, Severity::NORMAL, Vec::new()))
            .unwrap();

        emit(&state, Level::Info, "google_music_scripts::core", "hello");

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('['), "unexpected line: {content:?}");
        assert!(content.ends_with("] hello\n"), "unexpected line: {content:?}");
        assert!(!content.contains('\x1b'));
    }

    #[test]
    fn test_records_below_threshold_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        let state = LoggingState::detached();
        state
            .reconfigure(&file_plan(&path, Severity::WARNING, Vec::new()))
            .unwrap();

        emit(&state, Level::Info, "gms", "too quiet");
        emit(&state, Level::Warn, "gms", "loud enough");

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("too quiet"));
        assert!(content.contains("loud enough"));
    }

    #[test]
    fn test_numeric_severity_separates_records_of_one_level() {
        let dir = TempDir::new().unwrap();
        let normal_path = dir.path().join("normal.log");
        let info_path = dir.path().join("info.log");

        let normal = LoggingState::detached();
        normal
            .reconfigure(&file_plan(&normal_path, Severity::NORMAL, Vec::new()))
            .unwrap();
        let info = LoggingState::detached();
        info.reconfigure(&file_plan(&info_path, Severity::INFO, Vec::new()))
            .unwrap();

        for state in [&normal, &info] {
            emit_at(state, Severity::NORMAL, "summary");
            emit_at(state, Severity::INFO, "detail");
            emit_at(state, Severity::ACTION, "per-item");
        }

        let normal_content = fs::read_to_string(&normal_path).unwrap();
        assert!(normal_content.contains("summary"));
        assert!(!normal_content.contains("detail"));
        let info_content = fs::read_to_string(&info_path).unwrap();
        assert!(info_content.contains("summary"));
        assert!(info_content.contains("detail"));
        assert!(!info_content.contains("per-item"));
    }

    #[test]
    fn test_file_location_is_not_written_into_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        let state = LoggingState::detached();
        let mut plan = file_plan(&path, Severity::NORMAL, Vec::new());
        plan.sinks.insert(
            0,
            SinkSpec {
                destination: SinkDestination::Stdout,
                threshold: Severity::NORMAL,
                timestamp_format: "%H:%M:%S",
                styled: false,
            },
        );

        state.reconfigure(&plan).unwrap();
        emit(&state, Level::Info, "google_music_scripts::core", "after setup");

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("Logging to file"));
        assert!(content.contains("after setup"));
    }

    #[test]
    fn test_dependency_channels_silenced_unless_enabled() {
        let dir = TempDir::new().unwrap();
        let quiet_path = dir.path().join("quiet.log");
        let debug_path = dir.path().join("debug.log");

        let quiet = LoggingState::detached();
        quiet
            .reconfigure(&file_plan(&quiet_path, Severity::TRACE, Vec::new()))
            .unwrap();
        let debug = LoggingState::detached();
        debug
            .reconfigure(&file_plan(&debug_path, Severity::TRACE, DEPENDENCY_CHANNELS.to_vec()))
            .unwrap();

        for state in [&quiet, &debug] {
            emit(state, Level::Error, "google_music::client", "dependency");
            emit(state, Level::Error, "google_music_scripts::core", "own");
        }

        let quiet_content = fs::read_to_string(&quiet_path).unwrap();
        assert!(!quiet_content.contains("dependency"));
        assert!(quiet_content.contains("own"));
        let debug_content = fs::read_to_string(&debug_path).unwrap();
        assert!(debug_content.contains("dependency"));
        assert!(debug_content.contains("own"));
    }

    #[test]
    fn test_reconfigure_replaces_sinks() {
        let dir = TempDir::new().unwrap();
        let state = LoggingState::detached();
        let mut plan = file_plan(&dir.path().join("a.log"), Severity::NORMAL, Vec::new());
        plan.sinks.push(SinkSpec {
            destination: SinkDestination::Stdout,
            threshold: Severity::NORMAL,
            timestamp_format: "%H:%M:%S",
            styled: true,
        });

        state.reconfigure(&plan).unwrap();
        assert_eq!(state.sink_count(), 2);

        state.reconfigure(&plan.without_file()).unwrap();
        assert_eq!(state.sink_count(), 1);
        state.reconfigure(&plan.without_file()).unwrap();
        assert_eq!(state.sink_count(), 1);
    }

    #[test]
    fn test_failed_reconfigure_keeps_previous_sinks() {
        let dir = TempDir::new().unwrap();
        let state = LoggingState::detached();
        state
            .reconfigure(&file_plan(&dir.path().join("a.log"), Severity::NORMAL, Vec::new()))
            .unwrap();

        let unreachable = dir.path().join("missing-dir").join("b.log");
        let result = state.reconfigure(&file_plan(&unreachable, Severity::NORMAL, Vec::new()));

        assert!(matches!(result, Err(LogSetupError::OpenFile { .. })));
        assert_eq!(state.sink_count(), 1);
    }

    #[test]
    fn test_only_one_global_install() {
        let _ = LoggingState::install();
        assert!(matches!(
            LoggingState::install(),
            Err(LogSetupError::AlreadyInstalled)
        ));
    }
}
