// src/core/commands.rs

use lazy_static::lazy_static;
use std::collections::HashSet;

/// A command, and the single alias it is interchangeable with (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandIdentity {
    /// The full command name, e.g. `upload`.
    pub name: &'static str,
    /// The short partner name, e.g. `up`.
    pub alias: Option<&'static str>,
}

/// The single source of truth for command names and their aliases.
/// An alias names the same command; there are no alias chains.
pub static COMMAND_REGISTRY: &[CommandIdentity] = &[
    CommandIdentity {
        name: "delete",
        alias: Some("del"),
    },
    CommandIdentity {
        name: "download",
        alias: Some("down"),
    },
    CommandIdentity {
        name: "quota",
        alias: None,
    },
    CommandIdentity {
        name: "search",
        alias: None,
    },
    CommandIdentity {
        name: "upload",
        alias: Some("up"),
    },
];

lazy_static! {
    /// Every command name and alias. These keys name group blocks inside `defaults`,
    /// so they are never treated as option names.
    static ref RESERVED_KEYS: HashSet<&'static str> = COMMAND_REGISTRY
        .iter()
        .flat_map(|cmd| std::iter::once(cmd.name).chain(cmd.alias))
        .collect();
}

/// Finds a command in the registry by its name or alias.
pub fn find_command(name: &str) -> Option<&'static CommandIdentity> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.alias == Some(name))
}

/// Returns the partner of `name` in its alias pair.
///
/// `alias_of("upload")` is `Some("up")` and `alias_of("up")` is `Some("upload")`.
pub fn alias_of(name: &str) -> Option<&'static str> {
    let cmd = find_command(name)?;
    if cmd.name == name { cmd.alias } else { Some(cmd.name) }
}

/// Whether `key` names a command group rather than an option.
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_relation_is_symmetric() {
        for cmd in COMMAND_REGISTRY {
            if let Some(alias) = cmd.alias {
                assert_eq!(alias_of(cmd.name), Some(alias));
                assert_eq!(alias_of(alias), Some(cmd.name));
            } else {
                assert_eq!(alias_of(cmd.name), None);
            }
        }
    }

    #[test]
    fn test_known_pairs() {
        assert_eq!(alias_of("upload"), Some("up"));
        assert_eq!(alias_of("del"), Some("delete"));
        assert_eq!(alias_of("down"), Some("download"));
        assert_eq!(alias_of("quota"), None);
        assert_eq!(alias_of("sync"), None);
    }

    #[test]
    fn test_find_command_by_alias() {
        let cmd = find_command("up").unwrap();
        assert_eq!(cmd.name, "upload");
        assert!(find_command("uploads").is_none());
    }

    #[test]
    fn test_reserved_keys_cover_names_and_aliases() {
        for key in ["del", "delete", "down", "download", "quota", "search", "up", "upload"] {
            assert!(is_reserved_key(key), "{key} should be reserved");
        }
        assert!(!is_reserved_key("dry-run"));
        assert!(!is_reserved_key("Upload"));
    }
}
