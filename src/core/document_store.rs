// src/core/document_store.rs

//! Reads and writes the settings document.
//!
//! The document is kept as a `toml_edit` document, so a read-modify-write cycle never
//! reorders or drops keys the resolver does not know about, and leaves the user's
//! comments and layout in place.

use crate::models::SettingsDocument;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use toml_edit::{Item, Table, Value};

/// Failures of loading or persisting the settings document.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("Could not read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The settings file exists but is not valid TOML.
    #[error("Error parsing TOML in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml_edit::TomlError,
    },
    /// The directory that should hold the settings file could not be created.
    #[error("Could not create settings directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The settings file could not be written.
    #[error("Could not write settings file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// The document exists but could not be loaded.
    pub fn is_read_error(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Parse { .. })
    }

    /// The document could not be persisted.
    pub fn is_write_error(&self) -> bool {
        matches!(self, Self::CreateDir { .. } | Self::Write { .. })
    }
}

type StoreResult<T> = Result<T, ConfigError>;

/// Loads the document at `path`. A missing file is `Ok(None)`, not an error.
pub fn load(path: &Path) -> StoreResult<Option<SettingsDocument>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            });
        }
    };

    let document = content
        .parse::<SettingsDocument>()
        .map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Some(document))
}

/// Overwrites the file at `path` with `document`, creating parent directories first.
///
/// A parsed document is written back as it was read. In a document assembled in code,
/// a table followed by a plain value is written inline, since a `[table]` header
/// would otherwise capture the value that comes after it.
pub fn save(path: &Path, document: &SettingsDocument) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let mut document = document.clone();
    keep_key_order(document.as_document_mut().as_table_mut());
    fs::write(path, document.to_string()).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Loads the document at `path`, falling back to an empty one, and writes it back.
///
/// Afterwards the file is guaranteed to exist and to hold valid TOML.
pub fn load_or_initialize(path: &Path) -> StoreResult<SettingsDocument> {
    let document = match load(path)? {
        Some(document) => document,
        None => {
            log::debug!(
                "Settings file '{}' not found. Creating an empty one.",
                path.display()
            );
            SettingsDocument::new()
        }
    };

    save(path, &document)?;
    Ok(document)
}

/// Items written in place: plain values and dotted-key tables.
fn is_in_place(item: &Item) -> bool {
    match item {
        Item::Value(_) => true,
        Item::Table(table) => table.is_dotted(),
        Item::None | Item::ArrayOfTables(_) => false,
    }
}

fn keep_key_order(table: &mut Table) {
    let last_in_place = table
        .iter()
        .enumerate()
        .filter(|(_, (_, item))| is_in_place(item))
        .map(|(index, _)| index)
        .last();

    for (index, (_, item)) in table.iter_mut().enumerate() {
        if last_in_place.is_some_and(|last| index < last) && !is_in_place(item) {
            *item = match std::mem::take(item) {
                Item::Table(table) => Item::Value(Value::InlineTable(table.into_inline_table())),
                Item::ArrayOfTables(tables) => Item::Value(Value::Array(tables.into_array())),
                other => other,
            };
            continue;
        }
        match item {
            Item::Table(table) => keep_key_order(table),
            Item::ArrayOfTables(tables) => tables.iter_mut().for_each(keep_key_order),
            Item::None | Item::Value(_) => {}
        }
    }
}
