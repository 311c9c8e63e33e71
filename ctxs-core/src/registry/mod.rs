//! ctxs Registry - resolution engine for component registries
//!
//! Resolves requested item names against a remote JSON registry, walks
//! their registry dependencies, and merges the result into a single
//! [`InstallationPlan`] for file writers and dependency updaters.
//!
//! # Architecture
//!
//! ```text
//! Registry (HTTP)
//!     │
//!     ├── index.json                  ← Every item, no file bodies
//!     └── styles/{style}/{name}.json  ← Full item documents
//!            │
//!            ▼
//!     RegistryTransport  → FetchCache (one request per URL)
//!            │
//!            ▼
//!     resolver           ← index-based or on-demand walk
//!            │
//!            ▼
//!     merge              → InstallationPlan
//!            │
//!            ▼
//!     paths              → destination per file
//! ```

mod cache;
mod client;
mod error;
mod merge;
mod paths;
mod resolver;
mod schema;
mod transport;
mod url;

pub use cache::{FetchCache, FetchResult};
pub use client::{
    RegistryClient, RegistryConfig, DEFAULT_REGISTRY_URL, DEFAULT_STYLE, DEFAULT_TIMEOUT_SECONDS,
    INDEX_PATH, PROXY_ENV, REGISTRY_URL_ENV,
};
pub use error::{RegistryError, ValidationError};
pub use merge::{merge, InstallationPlan};
pub use paths::{
    alias_dir, file_destination, registry_type_alias_map, split_item_type, target_path, Alias,
};
pub use resolver::{
    prioritize_index, registry_parent_map, resolve_items_tree, resolve_registry_dependencies,
    resolve_registry_items, resolve_tree, Resolution, ResolveFailure, ResolvedItem, ResolvedPlan,
    INDEX_NAME,
};
pub use schema::{
    parse_index, parse_item, parse_items, CssVars, RegistryIndex, RegistryItem, RegistryItemFile,
    RegistryItemType, TailwindConfig, TailwindFragment,
};
pub use transport::{classify_status, fetch_json, HttpTransport, RawResponse, RegistryTransport};
pub use url::{is_url, item_path, registry_url};
