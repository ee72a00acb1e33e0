// src/constants.rs

/// The application name, used as the leaf of every base directory.
pub const APP_NAME: &str = "google-music-scripts";

/// The vendor name. Only part of the base directory on Windows.
pub const APP_VENDOR: &str = "thebigmunch";

/// The name of the settings document (inside the config base, or a profile subdirectory of it).
pub const SETTINGS_FILENAME: &str = "google-music-scripts.toml";

/// The top-level key of the settings document holding per-command defaults.
pub const DEFAULTS_KEY: &str = "defaults";

/// The name of the log directory (inside the data base, or a profile subdirectory of it).
pub const LOG_DIRNAME: &str = "logs";

/// The extension given to every log file.
pub const LOG_FILE_EXTENSION: &str = "log";

/// `strftime` pattern used to name a log file.
pub const LOG_FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `strftime` pattern of the bracketed timestamp that prefixes every log line.
pub const LOG_LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Environment variable overriding the config base directory.
pub const CONFIG_DIR_ENV: &str = "GMS_CONFIG_DIR";

/// Environment variable overriding the data (log) base directory.
pub const DATA_DIR_ENV: &str = "GMS_DATA_DIR";

/// Verbosity index applied when the modifier is zero.
pub const BASE_VERBOSITY: i64 = 3;

/// Severity thresholds indexed by verbosity, quietest first.
pub const VERBOSITY_THRESHOLDS: [u8; 8] = [50, 40, 30, 25, 20, 15, 10, 5];

/// Log targets of dependencies. Silenced unless debug mode is on.
pub const DEPENDENCY_CHANNELS: &[&str] = &[
    "audio_metadata",
    "google_music",
    "google_music_proto",
    "google_music_utils",
];

/// Record key carrying a numeric severity that is finer than the `log` level.
pub const SEVERITY_KEY: &str = "severity";
