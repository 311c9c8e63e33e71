//! Installation plan merging
//!
//! Folds the resolved items, in order, into one plan. List fields are
//! concatenated as-is: merging `["x"]` and `["x", "y"]` gives
//! `["x", "x", "y"]`. [`InstallationPlan::deduplicated`] produces the
//! writer-ready form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use super::schema::{CssVars, RegistryItem, RegistryItemFile, TailwindConfig, TailwindFragment};

/// Everything the file writer and dependency updaters need
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationPlan {
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub dev_dependencies: Vec<String>,

    #[serde(default)]
    pub files: Vec<RegistryItemFile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tailwind: Option<TailwindFragment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_vars: Option<CssVars>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

/// Merge items in order into one plan
pub fn merge(items: &[RegistryItem]) -> InstallationPlan {
    items.iter().fold(InstallationPlan::default(), |mut plan, item| {
        plan.absorb(item);
        plan
    })
}

impl InstallationPlan {
    /// Append one item's payload
    pub fn absorb(&mut self, item: &RegistryItem) {
        self.dependencies.extend(item.dependencies.iter().cloned());
        self.dev_dependencies
            .extend(item.dev_dependencies.iter().cloned());
        self.files.extend(item.files.iter().cloned());

        if let Some(fragment) = &item.tailwind {
            merge_tailwind(self.tailwind.get_or_insert_with(Default::default), fragment);
        }

        if let Some(vars) = &item.css_vars {
            let merged = self.css_vars.get_or_insert_with(Default::default);
            merged.light.extend(vars.light.clone());
            merged.dark.extend(vars.dark.clone());
        }

        if item.docs.is_some() {
            self.docs = item.docs.clone();
        }
    }

    /// Writer-ready copy of the plan
    ///
    /// Dependencies keep their first occurrence. Files keep the last
    /// occurrence of each `path`, in the order those last occurrences appear.
    pub fn deduplicated(&self) -> Self {
        Self {
            dependencies: dedup_first(&self.dependencies),
            dev_dependencies: dedup_first(&self.dev_dependencies),
            files: dedup_files_last(&self.files),
            tailwind: self.tailwind.clone(),
            css_vars: self.css_vars.clone(),
            docs: self.docs.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
            && self.dev_dependencies.is_empty()
            && self.files.is_empty()
            && self.tailwind.is_none()
            && self.css_vars.as_ref().map_or(true, CssVars::is_empty)
    }
}

fn dedup_first(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}

fn dedup_files_last(files: &[RegistryItemFile]) -> Vec<RegistryItemFile> {
    let last_index: HashMap<&str, usize> = files
        .iter()
        .enumerate()
        .map(|(i, f)| (f.path.as_str(), i))
        .collect();

    files
        .iter()
        .enumerate()
        .filter(|(i, f)| last_index.get(f.path.as_str()) == Some(i))
        .map(|(_, f)| f.clone())
        .collect()
}

fn merge_tailwind(target: &mut TailwindFragment, source: &TailwindFragment) {
    let Some(source_config) = &source.config else {
        return;
    };
    let config: &mut TailwindConfig = target.config.get_or_insert_with(Default::default);

    config.content.extend(source_config.content.iter().cloned());
    config.plugins.extend(source_config.plugins.iter().cloned());

    if let Some(theme) = &source_config.theme {
        deep_merge_map(config.theme.get_or_insert_with(Map::new), theme);
    }
}

/// Objects merge recursively, arrays concatenate, anything else is replaced
fn deep_merge_map(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        let merged = match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge_map(existing, incoming);
                true
            }
            (Some(Value::Array(existing)), Value::Array(incoming)) => {
                existing.extend(incoming.iter().cloned());
                true
            }
            _ => false,
        };

        if !merged {
            target.insert(key.clone(), value.clone());
        }
    }
}
