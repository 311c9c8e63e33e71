//! Install target resolution
//!
//! Two routes lead from an item type to a directory:
//!
//! - [`target_path`]: the type string is split into `namespace:kind`, the
//!   namespace is looked up in `resolvedPaths` and `kind` is joined on.
//! - [`alias_dir`]: the closed alias table maps well-known types to the
//!   project alias that holds them (`registry:ui` → `ui`, ...).
//!
//! `None` from either means "unresolvable": callers skip the file.

use std::fmt;
use std::path::{Path, PathBuf};

use super::schema::{RegistryItemFile, RegistryItemType};
use crate::config::Config;

/// Project aliases an item type can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alias {
    Components,
    Ui,
    Lib,
    Hooks,
}

impl Alias {
    /// Key of the alias in `resolvedPaths`
    pub fn as_str(&self) -> &'static str {
        match self {
            Alias::Components => "components",
            Alias::Ui => "ui",
            Alias::Lib => "lib",
            Alias::Hooks => "hooks",
        }
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RegistryItemType {
    /// Alias directory conventionally holding items of this type
    pub fn alias(&self) -> Option<Alias> {
        match self {
            RegistryItemType::Ui => Some(Alias::Ui),
            RegistryItemType::Lib => Some(Alias::Lib),
            RegistryItemType::Hook => Some(Alias::Hooks),
            RegistryItemType::Block | RegistryItemType::Component => Some(Alias::Components),
            _ => None,
        }
    }
}

/// The whole alias table, in declaration order
pub fn registry_type_alias_map() -> Vec<(RegistryItemType, Alias)> {
    RegistryItemType::ALL
        .into_iter()
        .filter_map(|ty| ty.alias().map(|alias| (ty, alias)))
        .collect()
}

/// Split `namespace:kind` at the first colon
pub fn split_item_type(item_type: &str) -> Option<(&str, &str)> {
    item_type.split_once(':')
}

/// Destination directory for an item type
///
/// A non-empty `override_path` always wins and is returned verbatim.
/// Otherwise the namespace must be a `resolvedPaths` key; any `kind` is
/// accepted.
pub fn target_path(
    config: &Config,
    item_type: &str,
    override_path: Option<&str>,
) -> Option<PathBuf> {
    if let Some(path) = override_path.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    let (namespace, kind) = split_item_type(item_type)?;
    let base = config.resolved_paths.get(namespace)?;
    Some(base.join(kind))
}

/// Directory of the alias a type maps to, if the project configures it
pub fn alias_dir(config: &Config, item_type: RegistryItemType) -> Option<PathBuf> {
    let alias = item_type.alias()?;
    config
        .resolved_paths
        .get(alias.as_str())
        .map(Path::to_path_buf)
}

/// Where a single file should be written
///
/// Explicit `target` first, then the alias directory plus the file name,
/// then the generic namespace lookup.
pub fn file_destination(config: &Config, file: &RegistryItemFile) -> Option<PathBuf> {
    if let Some(target) = file.target() {
        return target_path(config, file.file_type.as_str(), Some(target));
    }

    if let Some(dir) = alias_dir(config, file.file_type) {
        let file_name = Path::new(&file.path).file_name()?;
        return Some(dir.join(file_name));
    }

    target_path(config, file.file_type.as_str(), None)
}
