// src/models.rs

use crate::constants::SEVERITY_KEY;
use log::kv::{Key, Source};
use log::{Level, LevelFilter, Record};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use toml_edit::{DocumentMut, Item, TomlError};

// --- SETTINGS DOCUMENT ---

/// The on-disk settings document.
///
/// Backed by a `toml_edit` document, so comments, whitespace and key order of a
/// hand-edited file survive being written back. Nested tables under `defaults`
/// are command group blocks.
#[derive(Debug, Clone, Default)]
pub struct SettingsDocument(DocumentMut);

impl SettingsDocument {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the editable document.
    pub fn as_document(&self) -> &DocumentMut {
        &self.0
    }

    /// Mutably borrows the editable document.
    pub fn as_document_mut(&mut self) -> &mut DocumentMut {
        &mut self.0
    }

    /// True when the document holds no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key)
    }

    /// A plain value tree of the document, with formatting and comments dropped.
    pub fn to_table(&self) -> toml::Table {
        table_of(self.0.iter())
    }
}

impl FromStr for SettingsDocument {
    type Err = TomlError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        source.parse().map(Self)
    }
}

impl From<DocumentMut> for SettingsDocument {
    fn from(document: DocumentMut) -> Self {
        Self(document)
    }
}

impl fmt::Display for SettingsDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn table_of<'a>(items: impl Iterator<Item = (&'a str, &'a Item)>) -> toml::Table {
    items
        .filter_map(|(key, item)| Some((key.to_owned(), value_of_item(item)?)))
        .collect()
}

fn value_of_item(item: &Item) -> Option<toml::Value> {
    match item {
        Item::None => None,
        Item::Value(value) => Some(value_of(value)),
        Item::Table(table) => Some(toml::Value::Table(table_of(table.iter()))),
        Item::ArrayOfTables(tables) => Some(toml::Value::Array(
            tables
                .iter()
                .map(|table| toml::Value::Table(table_of(table.iter())))
                .collect(),
        )),
    }
}

fn value_of(value: &toml_edit::Value) -> toml::Value {
    match value {
        toml_edit::Value::String(s) => toml::Value::String(s.value().clone()),
        toml_edit::Value::Integer(i) => toml::Value::Integer(*i.value()),
        toml_edit::Value::Float(f) => toml::Value::Float(*f.value()),
        toml_edit::Value::Boolean(b) => toml::Value::Boolean(*b.value()),
        toml_edit::Value::Datetime(d) => toml::Value::Datetime(*d.value()),
        toml_edit::Value::Array(array) => {
            toml::Value::Array(array.iter().map(value_of).collect())
        }
        toml_edit::Value::InlineTable(table) => toml::Value::Table(
            table
                .iter()
                .map(|(key, value)| (key.to_owned(), value_of(value)))
                .collect(),
        ),
    }
}

// --- RESOLUTION OUTPUT ---

/// The flat option mapping produced for one command.
/// Keys are already normalized (`--output-dir` is stored as `output_dir`).
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct EffectiveDefaults(toml::Table);

impl EffectiveDefaults {
    /// Wraps an already normalized table.
    pub fn new(table: toml::Table) -> Self {
        Self(table)
    }

    /// Returns the value for a normalized key.
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.0.get(key)
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no layer contributed anything.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Option names in resolution order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Borrows the underlying table.
    pub fn as_table(&self) -> &toml::Table {
        &self.0
    }

    /// Deserializes the defaults into a caller-defined options struct.
    ///
    /// Missing keys fall back to whatever `#[serde(default)]` the target declares,
    /// so the entry point can layer CLI flags on top of the result.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, toml::de::Error> {
        toml::Value::Table(self.0.clone()).try_into()
    }
}

// --- LOGGING MODELS ---

/// A numeric severity. Higher is more severe; as a threshold, higher is quieter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Severity(u8);

impl Severity {
    /// Only critical failures.
    pub const CRITICAL: Self = Self(50);
    /// Errors.
    pub const ERROR: Self = Self(40);
    /// Warnings.
    pub const WARNING: Self = Self(30);
    /// Regular user-facing output.
    pub const NORMAL: Self = Self(25);
    /// Additional information.
    pub const INFO: Self = Self(20);
    /// Per-item success/failure reports.
    pub const ACTION: Self = Self(15);
    /// Debugging output.
    pub const DEBUG: Self = Self(10);
    /// Everything.
    pub const TRACE: Self = Self(5);

    /// Wraps a raw numeric severity.
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// The raw numeric severity.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The `log` level a record of this severity is emitted at.
    pub const fn level(self) -> Level {
        match self.0 {
            40.. => Level::Error,
            30..=39 => Level::Warn,
            20..=29 => Level::Info,
            10..=19 => Level::Debug,
            _ => Level::Trace,
        }
    }

    /// The severity of a record that carries no explicit one.
    pub const fn of_level(level: Level) -> Self {
        match level {
            Level::Error => Self::ERROR,
            Level::Warn => Self::WARNING,
            Level::Info => Self::NORMAL,
            Level::Debug => Self::DEBUG,
            Level::Trace => Self::TRACE,
        }
    }

    /// The severity of `record`: its `severity` key if present, otherwise its level's.
    pub fn of_record(record: &Record<'_>) -> Self {
        record
            .key_values()
            .get(Key::from(SEVERITY_KEY))
            .and_then(|value| value.to_u64())
            .map_or_else(
                || Self::of_level(record.level()),
                |value| Self(u8::try_from(value).unwrap_or(u8::MAX)),
            )
    }

    /// Whether `record` passes this threshold.
    pub fn admits(self, record: &Record<'_>) -> bool {
        Self::of_record(record) >= self
    }

    /// The `log` filter that lets through every record able to pass this threshold.
    /// Records of the same level but a lower severity are dropped by [`Severity::admits`].
    pub fn level_filter(self) -> LevelFilter {
        self.level().to_level_filter()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a sink delivers formatted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkDestination {
    /// The process's standard output.
    Stdout,
    /// A log file. Written as UTF-8 with `\n` line endings.
    File(PathBuf),
}

/// A declarative description of one output sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSpec {
    /// Where formatted records go.
    pub destination: SinkDestination,
    /// Records below this severity are dropped by the sink.
    pub threshold: Severity,
    /// `strftime` pattern of the bracketed timestamp prefixing every line.
    pub timestamp_format: &'static str,
    /// Colour the timestamp by record level when the destination is a terminal.
    pub styled: bool,
}

/// The full logging setup derived from a verbosity modifier and a few switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkPlan {
    /// Threshold shared by every sink of the plan.
    pub threshold: Severity,
    /// Sinks in attachment order: standard output first, then the file.
    pub sinks: Vec<SinkSpec>,
    /// Dependency channels allowed to emit. Every other dependency channel is silenced.
    pub enabled_channels: Vec<&'static str>,
}

impl SinkPlan {
    /// The log file this plan writes to, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.sinks.iter().find_map(|sink| match &sink.destination {
            SinkDestination::File(path) => Some(path.as_path()),
            SinkDestination::Stdout => None,
        })
    }

    /// The same plan with every file sink removed.
    pub fn without_file(&self) -> Self {
        Self {
            threshold: self.threshold,
            sinks: self
                .sinks
                .iter()
                .filter(|sink| sink.destination == SinkDestination::Stdout)
                .cloned()
                .collect(),
            enabled_channels: self.enabled_channels.clone(),
        }
    }
}

/// Inputs of the sink planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Signed shift applied to the base verbosity (`-v` raises it, `-q` lowers it).
    pub modifier: i64,
    /// Let the dependency channels emit.
    pub debug: bool,
    /// Attach a standard output sink.
    pub log_to_stdout: bool,
    /// Attach a timestamped log file sink.
    pub log_to_file: bool,
    /// Selects an alternate log directory.
    pub profile: Option<String>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            modifier: 0,
            debug: false,
            log_to_stdout: true,
            log_to_file: false,
            profile: None,
        }
    }
}
