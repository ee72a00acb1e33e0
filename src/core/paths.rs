// src/core/paths.rs

use crate::constants::{
    APP_NAME, APP_VENDOR, CONFIG_DIR_ENV, DATA_DIR_ENV, LOG_DIRNAME, SETTINGS_FILENAME,
};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find the system {kind} directory.")]
    BaseDirNotFound { kind: &'static str },
    #[error("Could not expand ${var}='{value}': {source}")]
    Expand {
        var: &'static str,
        value: String,
        #[source]
        source: shellexpand::LookupError<env::VarError>,
    },
}

/// The two base directories everything else is derived from.
///
/// ```text
/// <config_base>/<profile?>/google-music-scripts.toml
/// <data_base>/<profile?>/logs/<YYYY-MM-DD_HH-MM-SS>.log
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    config_base: PathBuf,
    data_base: PathBuf,
}

impl AppPaths {
    /// Uses explicit base directories. Nothing is created on disk.
    pub fn new(config_base: impl Into<PathBuf>, data_base: impl Into<PathBuf>) -> Self {
        Self {
            config_base: config_base.into(),
            data_base: data_base.into(),
        }
    }

    /// Resolves the platform base directories (`~/.config/google-music-scripts` and
    /// `~/.local/share/google-music-scripts` on Linux).
    ///
    /// `GMS_CONFIG_DIR` and `GMS_DATA_DIR` replace the respective base when set;
    /// `~` and `$VAR` references in them are expanded.
    pub fn from_system() -> Result<Self, PathError> {
        let config_base = resolve_base(
            CONFIG_DIR_ENV,
            env::var(CONFIG_DIR_ENV).ok(),
            dirs::config_dir(),
            "config",
        )?;
        let data_base = resolve_base(
            DATA_DIR_ENV,
            env::var(DATA_DIR_ENV).ok(),
            dirs::data_dir(),
            "data",
        )?;
        log::debug!(
            "Using config base '{}' and data base '{}'.",
            config_base.display(),
            data_base.display()
        );
        Ok(Self::new(config_base, data_base))
    }

    pub fn config_base(&self) -> &Path {
        &self.config_base
    }

    pub fn data_base(&self) -> &Path {
        &self.data_base
    }

    /// Path of the settings document for `profile`.
    pub fn settings_path(&self, profile: Option<&str>) -> PathBuf {
        scoped(&self.config_base, profile).join(SETTINGS_FILENAME)
    }

    /// Directory that holds the log files for `profile`.
    pub fn log_dir(&self, profile: Option<&str>) -> PathBuf {
        scoped(&self.data_base, profile).join(LOG_DIRNAME)
    }
}

/// Joins the profile subdirectory onto `base`. An empty profile means no profile.
fn scoped(base: &Path, profile: Option<&str>) -> PathBuf {
    match profile.filter(|p| !p.is_empty()) {
        Some(profile) => base.join(profile),
        None => base.to_path_buf(),
    }
}

fn resolve_base(
    var: &'static str,
    override_value: Option<String>,
    system_dir: Option<PathBuf>,
    kind: &'static str,
) -> Result<PathBuf, PathError> {
    if let Some(value) = override_value.filter(|v| !v.is_empty()) {
        let expanded = shellexpand::full(&value).map_err(|source| PathError::Expand {
            var,
            value: value.clone(),
            source,
        })?;
        return Ok(PathBuf::from(expanded.into_owned()));
    }

    let base = system_dir.ok_or(PathError::BaseDirNotFound { kind })?;
    // appdirs nests under the vendor on Windows only.
    if cfg!(target_os = "windows") {
        Ok(base.join(APP_VENDOR).join(APP_NAME))
    } else {
        Ok(base.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_path_without_profile() {
        let paths = AppPaths::new("/cfg", "/data");
        assert_eq!(
            paths.settings_path(None),
            PathBuf::from("/cfg/google-music-scripts.toml")
        );
    }

    #[test]
    fn test_profile_scopes_both_locations() {
        let paths = AppPaths::new("/cfg", "/data");
        assert_eq!(
            paths.settings_path(Some("alice")),
            PathBuf::from("/cfg/alice/google-music-scripts.toml")
        );
        assert_eq!(paths.log_dir(Some("alice")), PathBuf::from("/data/alice/logs"));
    }

    #[test]
    fn test_empty_profile_is_no_profile() {
        let paths = AppPaths::new("/cfg", "/data");
        assert_eq!(paths.settings_path(Some("")), paths.settings_path(None));
        assert_eq!(paths.log_dir(Some("")), PathBuf::from("/data/logs"));
    }

    #[test]
    fn test_resolve_base_prefers_override() {
        let base = resolve_base(
            CONFIG_DIR_ENV,
            Some("/tmp/gms-config".to_string()),
            Some(PathBuf::from("/home/u/.config")),
            "config",
        )
        .unwrap();
        assert_eq!(base, PathBuf::from("/tmp/gms-config"));
    }

    #[test]
    fn test_resolve_base_appends_app_name() {
        let base = resolve_base(CONFIG_DIR_ENV, None, Some(PathBuf::from("/sys")), "config").unwrap();
        assert!(base.ends_with(APP_NAME));
        assert!(base.starts_with("/sys"));
    }

    #[test]
    fn test_resolve_base_missing_system_dir() {
        let result = resolve_base(DATA_DIR_ENV, Some(String::new()), None, "data");
        assert!(matches!(result, Err(PathError::BaseDirNotFound { kind: "data" })));
    }

    #[test]
    fn test_resolve_base_undefined_variable() {
        let result = resolve_base(
            DATA_DIR_ENV,
            Some("$GMS_TEST_SURELY_UNDEFINED_VARIABLE/logs".to_string()),
            None,
            "data",
        );
        assert!(matches!(result, Err(PathError::Expand { .. })));
    }
}
