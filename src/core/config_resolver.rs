// src/core/config_resolver.rs

use crate::constants::DEFAULTS_KEY;
use crate::core::commands::{alias_of, is_reserved_key};
use crate::core::document_store::{self, ConfigError};
use crate::core::paths::AppPaths;
use crate::models::{EffectiveDefaults, SettingsDocument};
use toml::{Table, Value};

type ResolverResult<T> = Result<T, ConfigError>;

/// Computes per-command defaults from the settings document of a profile.
///
/// Layers, lowest to highest precedence:
///
/// 1. every non-command key directly under `[defaults]`
/// 2. the `[defaults.<command>]` block
/// 3. the `[defaults.<alias>]` block, where `<alias>` is the partner of `<command>`
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    paths: AppPaths,
}

// --- PUBLIC API ---

impl ConfigResolver {
    /// A resolver reading the settings files under `paths`.
    pub fn new(paths: AppPaths) -> Self {
        Self { paths }
    }

    /// The base directories this resolver reads from.
    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    /// Loads the settings document of `profile`, creating an empty one if it is missing.
    ///
    /// The document is always written back, so the file exists and is valid TOML afterwards.
    /// Comments and layout of an existing file are kept.
    pub fn read_settings(&self, profile: Option<&str>) -> ResolverResult<SettingsDocument> {
        document_store::load_or_initialize(&self.paths.settings_path(profile))
    }

    /// Replaces the settings document of `profile`.
    pub fn write_settings(
        &self,
        profile: Option<&str>,
        document: &SettingsDocument,
    ) -> ResolverResult<()> {
        document_store::save(&self.paths.settings_path(profile), document)
    }

    /// Resolves the effective defaults of `command` for `profile`.
    ///
    /// # Errors
    /// Returns a read error if the settings file exists but cannot be parsed, and a write
    /// error if it cannot be (re)written. A missing file or missing blocks are not errors.
    pub fn resolve_defaults(
        &self,
        command: &str,
        profile: Option<&str>,
    ) -> ResolverResult<EffectiveDefaults> {
        let document = self.read_settings(profile)?;
        let defaults = merge_defaults(command, &document);
        log::debug!(
            "Resolved {} default(s) for '{}'.",
            defaults.len(),
            command
        );
        Ok(defaults)
    }
}

/// Merges the `defaults` layers of `document` that apply to `command`.
pub fn merge_defaults(command: &str, document: &SettingsDocument) -> EffectiveDefaults {
    let document = document.to_table();
    let Some(defaults) = defaults_block(&document) else {
        return EffectiveDefaults::default();
    };

    let mut resolved = Table::new();
    overlay(&mut resolved, defaults);

    if let Some(group) = group_block(defaults, command) {
        overlay(&mut resolved, group);
    }

    if let Some(group) = alias_of(command).and_then(|alias| group_block(defaults, alias)) {
        overlay(&mut resolved, group);
    }

    EffectiveDefaults::new(resolved)
}

/// Turns an option name as written by a user into its canonical form.
///
/// Leading dashes are dropped, inner dashes become underscores and ASCII letters are
/// lowercased: `--Output-Dir`, `output-dir` and `output_dir` all become `output_dir`.
/// Total over all strings; a key made only of dashes becomes the empty string.
pub fn normalize_key(key: &str) -> String {
    key.trim_start_matches('-')
        .chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

/// Normalizes every key of every table nested in `value`. Other values are returned as is.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Table(table) => Value::Table(
            table
                .into_iter()
                .map(|(key, value)| (normalize_key(&key), normalize_value(value)))
                .collect(),
        ),
        other => other,
    }
}

// --- LAYER HELPERS ---

fn defaults_block(document: &Table) -> Option<&Table> {
    match document.get(DEFAULTS_KEY)? {
        Value::Table(table) => Some(table),
        other => {
            log::warn!(
                "Ignoring '{}': expected a table, found {}.",
                DEFAULTS_KEY,
                other.type_str()
            );
            None
        }
    }
}

fn group_block<'a>(defaults: &'a Table, command: &str) -> Option<&'a Table> {
    match defaults.get(command)? {
        Value::Table(table) => Some(table),
        other => {
            log::warn!(
                "Ignoring '{}.{}': expected a table, found {}.",
                DEFAULTS_KEY,
                command,
                other.type_str()
            );
            None
        }
    }
}

/// Copies the option keys of `layer` onto `target`, overwriting on conflict.
/// Keys are normalized first so precedence is decided on canonical names.
fn overlay(target: &mut Table, layer: &Table) {
    for (key, value) in layer.iter().filter(|(key, _)| !is_reserved_key(key)) {
        target.insert(normalize_key(key), normalize_value(value.clone()));
    }
}
