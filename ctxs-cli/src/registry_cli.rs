//! Registry CLI commands
//!
//! `add`, `list` and `tree` all print to stdout; diagnostics go through
//! `tracing` to stderr.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::{debug, info, warn};

use ctxs_core::config::Config;
use ctxs_core::registry::{
    file_destination, resolve_items_tree, resolve_tree, InstallationPlan, RegistryClient,
    RegistryItemFile, ResolveFailure,
};

/// A component that still resolves but should no longer be used
struct Deprecation {
    name: &'static str,
    replaced_by: &'static str,
}

const DEPRECATED_COMPONENTS: [Deprecation; 2] = [
    Deprecation {
        name: "toast",
        replaced_by: "sonner",
    },
    Deprecation {
        name: "toaster",
        replaced_by: "sonner",
    },
];

fn deprecations<'a, S: AsRef<str>>(
    components: &'a [S],
) -> impl Iterator<Item = &'static Deprecation> + 'a {
    DEPRECATED_COMPONENTS
        .iter()
        .filter(move |d| components.iter().any(|c| c.as_ref() == d.name))
}

/// Flags for `ctxs add`
#[derive(Debug)]
pub struct AddOptions {
    pub cwd: PathBuf,
    pub all: bool,
    pub json: bool,
    pub silent: bool,
    pub path: Option<PathBuf>,
    /// `--style`; when absent the project's `components.json` style is used
    pub style: Option<String>,
}

/// Table row for planned files
#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Type")]
    file_type: String,
    #[tabled(rename = "Destination")]
    destination: String,
}

/// Destination for one file, honoring a `--path` override
fn destination(config: &Config, file: &RegistryItemFile, path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(dir) => {
            let file_name = Path::new(&file.path).file_name()?;
            Some(dir.join(file_name))
        }
        None => file_destination(config, file),
    }
}

fn file_rows(config: &Config, plan: &InstallationPlan, path: Option<&Path>) -> Vec<FileRow> {
    plan.files
        .iter()
        .map(|file| FileRow {
            file: file.path.clone(),
            file_type: file.file_type.to_string(),
            destination: destination(config, file, path)
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "(unresolved)".to_string()),
        })
        .collect()
}

fn failure_json(failure: &ResolveFailure) -> serde_json::Value {
    serde_json::json!({
        "requested": failure.requested,
        "requiredBy": failure.required_by,
        "url": failure.error.url(),
        "error": failure.error.to_string(),
    })
}

pub async fn add_command(
    client: &RegistryClient,
    components: Vec<String>,
    options: AddOptions,
) -> Result<()> {
    let config = Config::load(&options.cwd)?;

    let project_client;
    let client = if options.style.is_none() && config.style != client.config().style {
        debug!("Using style '{}' from {}", config.style, options.cwd.display());
        project_client = client.for_style(config.style.as_str());
        &project_client
    } else {
        client
    };

    let components = if options.all {
        let index = client
            .get_registry_index()
            .await
            .context("Failed to fetch the registry index")?;
        index.names().into_iter().map(str::to_string).collect()
    } else {
        components
    };

    if components.is_empty() {
        bail!("Please select at least one component to add (or pass --all)");
    }

    for deprecation in deprecations(&components) {
        warn!(
            "The {} component is deprecated. Use the {} component instead.",
            deprecation.name, deprecation.replaced_by
        );
    }

    let resolved = resolve_items_tree(client, &components)
        .await
        .context("Failed to resolve components")?;

    for failure in resolved.resolution.failed_requests() {
        warn!("Skipped '{}': {}", failure.requested, failure.error);
    }

    let plan = resolved.plan.deduplicated();
    info!(
        "Plan ready: {} files, {} dependencies, {} dev dependencies",
        plan.files.len(),
        plan.dependencies.len(),
        plan.dev_dependencies.len()
    );

    if options.silent {
        return Ok(());
    }

    let path = options.path.as_deref();

    if options.json {
        let destinations: Vec<serde_json::Value> = plan
            .files
            .iter()
            .map(|file| {
                serde_json::json!({
                    "path": file.path,
                    "destination": destination(&config, file, path),
                })
            })
            .collect();
        let failures: Vec<serde_json::Value> =
            resolved.resolution.failures.iter().map(failure_json).collect();

        let output = serde_json::json!({
            "items": resolved.resolution.urls(),
            "plan": plan,
            "destinations": destinations,
            "failures": failures,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "\nResolved {} item(s) for {}:\n",
        resolved.resolution.resolved.len(),
        components.join(", ")
    );

    if plan.files.is_empty() {
        println!("No files to install.");
    } else {
        let table = Table::new(file_rows(&config, &plan, path))
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();
        println!("{table}");
    }

    if !plan.dependencies.is_empty() {
        println!("\nDependencies:     {}", plan.dependencies.join(" "));
    }
    if !plan.dev_dependencies.is_empty() {
        println!("Dev dependencies: {}", plan.dev_dependencies.join(" "));
    }
    if let Some(docs) = &plan.docs {
        println!("\n{docs}");
    }

    Ok(())
}

/// Table row for the registry index
#[derive(Tabled)]
struct IndexRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    item_type: String,
    #[tabled(rename = "Depends on")]
    registry_dependencies: String,
}

pub async fn list_command(client: &RegistryClient, json: bool) -> Result<()> {
    let index = client
        .get_registry_index()
        .await
        .context("Failed to fetch the registry index")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    if index.is_empty() {
        println!("\nThe registry index is empty.");
        return Ok(());
    }

    println!("\nFound {} component(s):\n", index.len());

    let rows: Vec<IndexRow> = index
        .iter()
        .map(|entry| IndexRow {
            name: entry.name.clone(),
            item_type: entry.item_type.to_string(),
            registry_dependencies: entry.registry_dependencies.join(", "),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub async fn tree_command(client: &RegistryClient, names: Vec<String>, json: bool) -> Result<()> {
    let index = client
        .get_registry_index()
        .await
        .context("Failed to fetch the registry index")?;

    let tree = resolve_tree(&index, &names);
    if tree.is_empty() {
        bail!("None of {} are in the registry index", names.join(", "));
    }

    if json {
        let items = client
            .fetch_tree(&tree)
            .await
            .context("Failed to fetch component documents")?;
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for (position, entry) in tree.iter().enumerate() {
        println!("{:>3}. {} ({})", position + 1, entry.name, entry.item_type);
    }

    Ok(())
}
