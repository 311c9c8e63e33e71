//! Registry client configuration and document fetching

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::cache::{FetchCache, FetchResult};
use super::error::{RegistryError, ValidationError};
use super::schema::{self, RegistryIndex, RegistryItem};
use super::transport::{fetch_json, HttpTransport, RegistryTransport};
use super::url::{is_url, item_path, registry_url};

/// Default registry base URL
pub const DEFAULT_REGISTRY_URL: &str = "https://ctxs.ai/r";

/// Environment variable overriding the registry base URL
pub const REGISTRY_URL_ENV: &str = "REGISTRY_URL";

/// Environment variables consulted (in order) for an HTTPS proxy
pub const PROXY_ENV: [&str; 2] = ["https_proxy", "HTTPS_PROXY"];

/// Default style namespace for named items
pub const DEFAULT_STYLE: &str = "default";

/// Path of the index document relative to the base URL
pub const INDEX_PATH: &str = "index.json";

/// Default request timeout (30 seconds)
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Settings for talking to a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL relative registry paths are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Style namespace for `styles/{style}/{name}.json`
    #[serde(default = "default_style")]
    pub style: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Proxy every request goes through, if set
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            style: default_style(),
            timeout_seconds: default_timeout(),
            proxy: None,
        }
    }
}

impl RegistryConfig {
    /// Defaults overridden by `REGISTRY_URL` and `https_proxy`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RegistryConfig::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(base_url) = non_empty(REGISTRY_URL_ENV) {
            config.base_url = base_url;
        }
        config.proxy = PROXY_ENV.iter().find_map(|key| non_empty(*key));
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Fetches registry documents through a shared [`FetchCache`]
///
/// The cache is injected so one cache can span a single resolution, or
/// a whole long-lived host process that calls `clear()` between runs.
pub struct RegistryClient {
    config: RegistryConfig,
    transport: Arc<dyn RegistryTransport>,
    cache: Arc<FetchCache>,
}

impl RegistryClient {
    /// HTTP client with a fresh cache
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let transport = HttpTransport::new(config.timeout(), config.proxy.as_deref())?;
        Ok(Self::with_transport(
            config,
            Arc::new(transport),
            Arc::new(FetchCache::new()),
        ))
    }

    pub fn with_transport(
        config: RegistryConfig,
        transport: Arc<dyn RegistryTransport>,
        cache: Arc<FetchCache>,
    ) -> Self {
        Self {
            config,
            transport,
            cache,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Client for another style namespace, sharing transport and cache
    pub fn for_style(&self, style: impl Into<String>) -> Self {
        Self {
            config: self.config.clone().with_style(style),
            transport: Arc::clone(&self.transport),
            cache: Arc::clone(&self.cache),
        }
    }

    pub fn cache(&self) -> &Arc<FetchCache> {
        &self.cache
    }

    /// Absolute URL for a registry path or URL
    pub fn resolve_url(&self, path: &str) -> Result<String, RegistryError> {
        registry_url(&self.config.base_url, path)
    }

    /// Fetch an already-resolved URL through the cache
    pub async fn fetch_url(&self, url: &str) -> FetchResult {
        let transport = Arc::clone(&self.transport);
        let owned_url = url.to_string();

        self.cache
            .get_or_fetch(url, move || async move {
                fetch_json(transport.as_ref(), &owned_url)
                    .await
                    .map(Arc::new)
            })
            .await
    }

    /// Fetch one registry path or URL
    pub async fn fetch_path(&self, path: &str) -> FetchResult {
        let url = self.resolve_url(path)?;
        self.fetch_url(&url).await
    }

    /// Fetch a batch of paths concurrently, failing if any fetch fails
    ///
    /// Every request in the batch is issued at once; there is no cap.
    pub async fn fetch_registry<S>(
        &self,
        paths: &[S],
    ) -> Result<Vec<Arc<Value>>, RegistryError>
    where
        S: AsRef<str>,
    {
        debug!("Fetching {} registry documents", paths.len());
        try_join_all(paths.iter().map(|p| self.fetch_path(p.as_ref()))).await
    }

    /// Fetch and validate `index.json`
    pub async fn get_registry_index(&self) -> Result<RegistryIndex, RegistryError> {
        let url = self.resolve_url(INDEX_PATH)?;
        let raw = self.fetch_url(&url).await?;
        with_url(&url, schema::parse_index(&raw))
    }

    /// Fetch and validate one item by name (or URL)
    pub async fn get_registry_item(&self, name: &str) -> Result<RegistryItem, RegistryError> {
        let url = self.resolve_url(&self.locate(name))?;
        let raw = self.fetch_url(&url).await?;
        with_url(&url, schema::parse_item(&raw))
    }

    /// Fetch full documents for index entries, preserving their order
    pub async fn fetch_tree(
        &self,
        tree: &[RegistryItem],
    ) -> Result<Vec<RegistryItem>, RegistryError> {
        let paths: Vec<String> = tree.iter().map(|e| self.locate(&e.name)).collect();
        let raw = self.fetch_registry(&paths).await?;

        paths
            .iter()
            .zip(raw.iter())
            .map(|(path, value)| {
                let url = self.resolve_url(path)?;
                with_url(&url, schema::parse_item(value))
            })
            .collect()
    }

    /// Registry path for a requested name
    ///
    /// URLs and anything that already looks like a path (`/gh/acme/x.json`)
    /// are used as-is; a bare name lives at `styles/{style}/{name}.json`.
    pub fn locate(&self, name: &str) -> String {
        if is_url(name) || name.contains('/') || name.ends_with(".json") {
            name.to_string()
        } else {
            item_path(&self.config.style, name)
        }
    }
}

/// Attach the document URL to a validation failure
pub(crate) fn with_url<T>(
    url: &str,
    result: Result<T, ValidationError>,
) -> Result<T, RegistryError> {
    result.map_err(|source| RegistryError::Validation {
        url: url.to_string(),
        source,
    })
}
