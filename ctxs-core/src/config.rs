//! Project configuration (`components.json`)
//!
//! The file only declares import aliases; everything the resolver needs
//! is the absolute directory each alias points at (`resolvedPaths`).
//!
//! ```json
//! {
//!   "style": "default",
//!   "aliases": { "components": "@/components", "ui": "@/components/ui" }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::registry::DEFAULT_STYLE;

/// Config file name looked up in the project root
pub const CONFIG_FILE: &str = "components.json";

/// Import alias prefixes that stand for the project root
const ROOT_ALIAS_PREFIXES: [&str; 2] = ["@/", "~/"];

/// Aliases as written in `components.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aliases {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utils: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<String>,
}

/// Raw `components.json` contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default)]
    pub aliases: Aliases,
}

/// Absolute directories derived from the aliases
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    pub cwd: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lib: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utils: Option<PathBuf>,
}

impl ResolvedPaths {
    /// Look up a resolved directory by its key name
    pub fn get(&self, key: &str) -> Option<&Path> {
        match key {
            "cwd" => Some(self.cwd.as_path()),
            "components" => self.components.as_deref(),
            "ui" => self.ui.as_deref(),
            "lib" => self.lib.as_deref(),
            "hooks" => self.hooks.as_deref(),
            "utils" => self.utils.as_deref(),
            _ => None,
        }
    }
}

/// Read-only project configuration consumed by the path resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub style: String,
    pub aliases: Aliases,
    pub resolved_paths: ResolvedPaths,
}

impl Config {
    /// Load `components.json` from `cwd`, falling back to defaults if absent
    pub fn load(cwd: &Path) -> Result<Self> {
        let config_path = cwd.join(CONFIG_FILE);

        let raw = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read project config: {}", config_path.display())
            })?;
            serde_json::from_str(&content).with_context(|| {
                format!(
                    "Invalid configuration found in {}",
                    config_path.display()
                )
            })?
        } else {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE, cwd.display());
            RawConfig::default()
        };

        Ok(Self::resolve(cwd, raw))
    }

    /// Resolve every alias against `cwd`
    pub fn resolve(cwd: &Path, raw: RawConfig) -> Self {
        let resolve = |alias: &Option<String>| alias.as_deref().map(|a| resolve_alias(cwd, a));

        let resolved_paths = ResolvedPaths {
            cwd: cwd.to_path_buf(),
            components: resolve(&raw.aliases.components),
            ui: resolve(&raw.aliases.ui),
            lib: resolve(&raw.aliases.lib),
            hooks: resolve(&raw.aliases.hooks),
            utils: resolve(&raw.aliases.utils),
        };

        Self {
            style: raw.style.unwrap_or_else(|| DEFAULT_STYLE.to_string()),
            aliases: raw.aliases,
            resolved_paths,
        }
    }
}

/// `@/components` and `components` both become `{cwd}/components`
fn resolve_alias(cwd: &Path, alias: &str) -> PathBuf {
    let relative = ROOT_ALIAS_PREFIXES
        .iter()
        .find_map(|prefix| alias.strip_prefix(prefix))
        .unwrap_or(alias);

    let path = Path::new(relative);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path()).unwrap();

        assert_eq!(config.style, DEFAULT_STYLE);
        assert_eq!(config.resolved_paths.cwd, temp_dir.path());
        assert!(config.resolved_paths.ui.is_none());
    }

    #[test]
    fn test_aliases_resolve_against_cwd() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            r#"{
                "style": "new-york",
                "aliases": {
                    "components": "@/components",
                    "ui": "~/components/ui",
                    "lib": "src/lib",
                    "hooks": "/abs/hooks"
                }
            }"#,
        )
        .unwrap();

        let config = Config::load(temp_dir.path()).unwrap();
        let paths = &config.resolved_paths;

        assert_eq!(config.style, "new-york");
        assert_eq!(paths.components, Some(temp_dir.path().join("components")));
        assert_eq!(paths.ui, Some(temp_dir.path().join("components/ui")));
        assert_eq!(paths.lib, Some(temp_dir.path().join("src/lib")));
        assert_eq!(paths.hooks, Some(PathBuf::from("/abs/hooks")));
        assert_eq!(paths.utils, None);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "{ not json").unwrap();

        let err = Config::load(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_resolved_paths_get() {
        let config = Config::resolve(
            Path::new("/project"),
            RawConfig {
                aliases: Aliases {
                    ui: Some("@/components/ui".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
        );

        let paths = &config.resolved_paths;
        assert_eq!(paths.get("cwd"), Some(Path::new("/project")));
        assert_eq!(paths.get("ui"), Some(Path::new("/project/components/ui")));
        assert_eq!(paths.get("lib"), None);
        assert_eq!(paths.get("registry"), None);
    }
}
