//! Dependency resolution
//!
//! Two strategies walk `registryDependencies` edges:
//!
//! - [`resolve_tree`] works purely on a pre-fetched index.
//! - [`resolve_registry_items`] fetches every item on demand.
//!
//! Both are depth-first pre-order walks over an explicit worklist and
//! both return items in first-discovery order: an item appears once, at
//! the position it was first reached, and cycles terminate.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use super::client::{with_url, RegistryClient};
use super::error::RegistryError;
use super::merge::{merge, InstallationPlan};
use super::schema::{self, RegistryIndex, RegistryItem};

/// Name of the registry's base/style item, always resolved first
pub const INDEX_NAME: &str = "index";

/// Move `"index"` to the front of the requested names
///
/// Any item implicitly depending on registry metadata then sees it first.
/// Duplicate `"index"` requests collapse into the leading one.
pub fn prioritize_index<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();

    let mut ordered = Vec::with_capacity(names.len());
    if names.contains(&INDEX_NAME) {
        ordered.push(INDEX_NAME.to_string());
    }
    ordered.extend(
        names
            .into_iter()
            .filter(|n| *n != INDEX_NAME)
            .map(str::to_string),
    );
    ordered
}

/// Resolve `names` and their transitive dependencies against an index
///
/// Names missing from the index are skipped without error.
pub fn resolve_tree<S: AsRef<str>>(index: &RegistryIndex, names: &[S]) -> Vec<RegistryItem> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut worklist: Vec<&str> = names.iter().rev().map(AsRef::as_ref).collect();
    let mut tree = Vec::new();

    while let Some(name) = worklist.pop() {
        if visited.contains(name) {
            continue;
        }

        let Some(entry) = index.find(name) else {
            debug!("'{}' is not in the registry index, skipping", name);
            continue;
        };

        visited.insert(entry.name.as_str());
        tree.push(entry.clone());
        worklist.extend(entry.registry_dependencies.iter().rev().map(String::as_str));
    }

    tree
}

/// An item fetched during on-demand resolution
#[derive(Debug, Clone)]
pub struct ResolvedItem {
    pub url: String,
    pub item: RegistryItem,
}

/// A name or URL that could not be fetched or parsed
#[derive(Debug, Clone)]
pub struct ResolveFailure {
    /// Name or URL as it was requested
    pub requested: String,

    /// Item that declared the dependency; `None` for a top-level request
    pub required_by: Option<String>,

    pub error: RegistryError,
}

impl ResolveFailure {
    pub fn is_top_level(&self) -> bool {
        self.required_by.is_none()
    }
}

/// Result of an on-demand resolution
///
/// Failures never abort the walk; they are collected here instead.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub resolved: Vec<ResolvedItem>,
    pub failures: Vec<ResolveFailure>,
}

impl Resolution {
    /// Resolved URLs in first-discovery order
    pub fn urls(&self) -> Vec<&str> {
        self.resolved.iter().map(|r| r.url.as_str()).collect()
    }

    pub fn items(&self) -> Vec<RegistryItem> {
        self.resolved.iter().map(|r| r.item.clone()).collect()
    }

    /// Failures of names the caller asked for directly
    pub fn failed_requests(&self) -> impl Iterator<Item = &ResolveFailure> {
        self.failures.iter().filter(|f| f.is_top_level())
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Resolve one name and everything it depends on
///
/// `visited` holds resolved URLs and is shared across calls, so a name
/// requested directly and reached as a dependency is only walked once.
pub async fn resolve_registry_dependencies(
    client: &RegistryClient,
    name: &str,
    visited: &mut HashSet<String>,
    resolution: &mut Resolution,
) {
    let mut worklist: Vec<(String, Option<String>)> = vec![(name.to_string(), None)];

    while let Some((requested, required_by)) = worklist.pop() {
        let url = match client.resolve_url(&client.locate(&requested)) {
            Ok(url) => url,
            Err(error) => {
                record_failure(resolution, requested, required_by, error);
                continue;
            }
        };

        if !visited.insert(url.clone()) {
            debug!("Already visited {}", url);
            continue;
        }

        let fetched = match client.fetch_url(&url).await {
            Ok(raw) => with_url(&url, schema::parse_item(&raw)),
            Err(error) => Err(error),
        };

        match fetched {
            Ok(item) => {
                debug!(
                    "Resolved '{}' ({} registry dependencies)",
                    item.name,
                    item.registry_dependencies.len()
                );
                worklist.extend(
                    item.registry_dependencies
                        .iter()
                        .rev()
                        .map(|dep| (dep.clone(), Some(item.name.clone()))),
                );
                resolution.resolved.push(ResolvedItem { url, item });
            }
            Err(error) => record_failure(resolution, requested, required_by, error),
        }
    }
}

fn record_failure(
    resolution: &mut Resolution,
    requested: String,
    required_by: Option<String>,
    error: RegistryError,
) {
    match &required_by {
        Some(parent) => warn!(
            "Error fetching or parsing registry item '{}' (required by '{}'): {}",
            requested, parent, error
        ),
        None => warn!(
            "Error fetching or parsing registry item '{}': {}",
            requested, error
        ),
    }

    resolution.failures.push(ResolveFailure {
        requested,
        required_by,
        error,
    });
}

/// Resolve every name on demand, in order
pub async fn resolve_registry_items<S: AsRef<str>>(
    client: &RegistryClient,
    names: &[S],
) -> Resolution {
    let mut visited = HashSet::new();
    let mut resolution = Resolution::default();

    for name in names {
        resolve_registry_dependencies(client, name.as_ref(), &mut visited, &mut resolution).await;
    }

    resolution
}

/// Plan produced by [`resolve_items_tree`] with the resolution behind it
#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    pub plan: InstallationPlan,
    pub resolution: Resolution,
}

/// Resolve names end to end into an installation plan
///
/// Fails when the index cannot be loaded or when nothing resolved at all.
/// Individual failures are reported in `resolution.failures`.
pub async fn resolve_items_tree<S: AsRef<str>>(
    client: &RegistryClient,
    names: &[S],
) -> Result<ResolvedPlan, RegistryError> {
    let index = client.get_registry_index().await?;
    debug!("Registry index lists {} items", index.len());

    let names = prioritize_index(names);
    let resolution = resolve_registry_items(client, &names).await;

    if resolution.is_empty() {
        return Err(RegistryError::NothingResolved { names });
    }

    let plan = merge(&resolution.items());
    info!(
        "Resolved {} registry items ({} files, {} dependencies)",
        resolution.resolved.len(),
        plan.files.len(),
        plan.dependencies.len()
    );

    Ok(ResolvedPlan { plan, resolution })
}

/// Map each dependency name to the item that declared it (last declarer wins)
pub fn registry_parent_map(items: &[RegistryItem]) -> HashMap<&str, &RegistryItem> {
    let mut parents = HashMap::new();
    for item in items {
        for dependency in &item.registry_dependencies {
            parents.insert(dependency.as_str(), item);
        }
    }
    parents
}
