//! ctxs - resolve registry components into an installation plan
//!
//! Main entry point: argument parsing, logging setup and dispatch

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ctxs_core::registry::{RegistryClient, RegistryConfig};

mod registry_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "ctxs",
    about = "Resolve registry components and their dependencies into an installation plan",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Emit structured JSON traces of registry resolution
    #[clap(long, global = true)]
    trace: bool,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Registry base URL (overrides REGISTRY_URL)
    #[clap(long, global = true)]
    registry: Option<String>,

    /// Style namespace for named components
    #[clap(long, global = true)]
    style: Option<String>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Resolve components and print the installation plan
    Add {
        /// Component names or URLs
        components: Vec<String>,

        /// Project root containing components.json
        #[clap(long, default_value = ".")]
        cwd: PathBuf,

        /// Resolve every component listed in the registry index
        #[clap(long)]
        all: bool,

        /// Output the plan as JSON
        #[clap(long)]
        json: bool,

        /// Print nothing on success
        #[clap(long)]
        silent: bool,

        /// Directory every file is placed in, instead of its alias directory
        #[clap(long)]
        path: Option<PathBuf>,
    },

    /// List the components in the registry index
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show the index-based resolution order for components
    Tree {
        /// Component names
        #[clap(required = true)]
        names: Vec<String>,

        /// Fetch and print the full item documents as JSON
        #[clap(long)]
        json: bool,
    },
}

fn initialize_tracing(log_level: &LogLevel, trace: bool) {
    let mut filter = EnvFilter::new(log_level.to_filter_directive());

    if trace {
        if let Ok(directive) = "ctxs_core::registry=trace".parse() {
            filter = filter.add_directive(directive);
        }

        // JSON output for structured tracing - MUST go to stderr
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .init();

        tracing::info!("ctxs resolution tracing enabled");
    } else {
        // Plans go to stdout, logs stay on stderr
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn registry_client(registry: Option<String>, style: Option<String>) -> Result<RegistryClient> {
    let mut config = RegistryConfig::from_env();
    if let Some(base_url) = registry {
        config = config.with_base_url(base_url);
    }
    if let Some(style) = style {
        config = config.with_style(style);
    }

    tracing::debug!("Using registry {} (style '{}')", config.base_url, config.style);
    RegistryClient::new(config).context("Failed to create registry client")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.trace);

    let client = registry_client(cli.registry, cli.style.clone())?;

    match cli.command {
        Command::Add {
            components,
            cwd,
            all,
            json,
            silent,
            path,
        } => {
            let options = registry_cli::AddOptions {
                cwd,
                all,
                json,
                silent,
                path,
                style: cli.style,
            };
            registry_cli::add_command(&client, components, options).await
        }
        Command::List { json } => registry_cli::list_command(&client, json).await,
        Command::Tree { names, json } => registry_cli::tree_command(&client, names, json).await,
    }
}
