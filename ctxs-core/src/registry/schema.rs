//! Registry item schema and validation
//!
//! A registry serves one JSON document per item plus an `index.json`
//! listing every item. Documents are validated once, at parse time, and
//! are immutable afterwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::error::ValidationError;

/// The closed set of item (and file) types a registry may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryItemType {
    #[serde(rename = "registry:lib")]
    Lib,
    #[serde(rename = "registry:block")]
    Block,
    #[serde(rename = "registry:component")]
    Component,
    #[serde(rename = "registry:ui")]
    Ui,
    #[serde(rename = "registry:hook")]
    Hook,
    #[serde(rename = "registry:page")]
    Page,
    #[serde(rename = "registry:file")]
    File,
    #[serde(rename = "registry:theme")]
    Theme,
    #[serde(rename = "registry:example")]
    Example,
    #[serde(rename = "registry:style")]
    Style,
    #[serde(rename = "registry:internal")]
    Internal,
}

impl RegistryItemType {
    pub const ALL: [RegistryItemType; 11] = [
        RegistryItemType::Lib,
        RegistryItemType::Block,
        RegistryItemType::Component,
        RegistryItemType::Ui,
        RegistryItemType::Hook,
        RegistryItemType::Page,
        RegistryItemType::File,
        RegistryItemType::Theme,
        RegistryItemType::Example,
        RegistryItemType::Style,
        RegistryItemType::Internal,
    ];

    /// Wire name, e.g. `registry:ui`
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryItemType::Lib => "registry:lib",
            RegistryItemType::Block => "registry:block",
            RegistryItemType::Component => "registry:component",
            RegistryItemType::Ui => "registry:ui",
            RegistryItemType::Hook => "registry:hook",
            RegistryItemType::Page => "registry:page",
            RegistryItemType::File => "registry:file",
            RegistryItemType::Theme => "registry:theme",
            RegistryItemType::Example => "registry:example",
            RegistryItemType::Style => "registry:style",
            RegistryItemType::Internal => "registry:internal",
        }
    }

    /// Files of these types are routed only by their explicit `target`
    pub fn requires_target(&self) -> bool {
        matches!(self, RegistryItemType::File | RegistryItemType::Page)
    }
}

impl fmt::Display for RegistryItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistryItemType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegistryItemType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::Schema(format!("unknown registry item type '{s}'")))
    }
}

/// A single file shipped by a registry item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryItemFile {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(rename = "type")]
    pub file_type: RegistryItemType,

    /// Literal destination; wins over any alias-derived location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl RegistryItemFile {
    /// The declared target, with an empty string treated as absent
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref().filter(|t| !t.is_empty())
    }
}

/// Tailwind configuration fragment contributed by an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TailwindFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<TailwindConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TailwindConfig {
    /// Content globs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<String>,

    /// Theme tokens (arbitrary nested object)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Map<String, Value>>,

    /// Plugin names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,
}

/// Light/dark CSS variable maps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssVars {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub light: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dark: IndexMap<String, String>,
}

impl CssVars {
    pub fn is_empty(&self) -> bool {
        self.light.is_empty() && self.dark.is_empty()
    }
}

/// A named, typed unit of installable content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryItem {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    pub name: String,

    #[serde(rename = "type")]
    pub item_type: RegistryItemType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dev_dependencies: Vec<String>,

    /// Names or URLs of other items this one requires
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry_dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<RegistryItemFile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tailwind: Option<TailwindFragment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_vars: Option<CssVars>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl RegistryItem {
    /// Minimal item, mostly useful for building fixtures
    pub fn new(name: impl Into<String>, item_type: RegistryItemType) -> Self {
        Self {
            schema: None,
            name: name.into(),
            item_type,
            title: None,
            author: None,
            description: None,
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            registry_dependencies: Vec::new(),
            files: Vec::new(),
            tailwind: None,
            css_vars: None,
            meta: None,
            docs: None,
            categories: Vec::new(),
        }
    }

    /// Check the invariants serde cannot express
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if let Some(file) = self
            .files
            .iter()
            .find(|f| f.file_type.requires_target() && f.target().is_none())
        {
            return Err(ValidationError::MissingTarget {
                item: self.name.clone(),
                path: file.path.clone(),
                file_type: file.file_type.to_string(),
            });
        }

        Ok(())
    }
}

/// The registry's `index.json`: every item, usually without file bodies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryIndex {
    pub entries: Vec<RegistryItem>,
}

impl RegistryIndex {
    pub fn new(entries: Vec<RegistryItem>) -> Self {
        Self { entries }
    }

    /// First entry with the given name
    pub fn find(&self, name: &str) -> Option<&RegistryItem> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegistryItem> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RegistryIndex {
    type Item = &'a RegistryItem;
    type IntoIter = std::slice::Iter<'a, RegistryItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Parse and validate a single item document
pub fn parse_item(raw: &Value) -> Result<RegistryItem, ValidationError> {
    let item = RegistryItem::deserialize(raw)?;
    item.validate()?;
    Ok(item)
}

/// Parse and validate an index document
pub fn parse_index(raw: &Value) -> Result<RegistryIndex, ValidationError> {
    let index = RegistryIndex::deserialize(raw)?;
    for entry in &index.entries {
        entry.validate()?;
    }
    Ok(index)
}

/// Parse and validate a batch of item documents, failing on the first bad one
pub fn parse_items<'a, I>(raw: I) -> Result<Vec<RegistryItem>, ValidationError>
where
    I: IntoIterator<Item = &'a Value>,
{
    raw.into_iter().map(parse_item).collect()
}
