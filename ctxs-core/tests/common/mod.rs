//! Test helpers shared by the integration tests
//!
//! Provides an in-memory registry transport that counts requests per URL
//! and can hold every response back for a moment, so tests can observe
//! request coalescing.

#![allow(dead_code)]

use async_trait::async_trait;
use ctxs_core::registry::{
    FetchCache, RawResponse, RegistryClient, RegistryConfig, RegistryError, RegistryTransport,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

pub const BASE_URL: &str = "https://registry.test/r";

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Serves canned responses keyed by absolute URL; unknown URLs get a 404
#[derive(Default)]
pub struct FixtureTransport {
    responses: HashMap<String, RawResponse>,
    hits: Mutex<HashMap<String, usize>>,
    delay: Duration,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every response back by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Serve `body` at `{BASE_URL}/{path}` (or at `path` if absolute)
    pub fn with_json(mut self, path: &str, body: Value) -> Self {
        self.responses
            .insert(absolute(path), RawResponse::ok(body.to_string()));
        self
    }

    /// Serve an item document at `styles/default/{name}.json`
    pub fn with_item(self, name: &str, item_type: &str, registry_dependencies: &[&str]) -> Self {
        let path = format!("styles/default/{name}.json");
        self.with_json(
            &path,
            json!({
                "name": name,
                "type": item_type,
                "registryDependencies": registry_dependencies,
                "dependencies": [format!("{name}-pkg")],
                "files": [{"path": format!("ui/{name}.tsx"), "type": item_type, "content": name}]
            }),
        )
    }

    /// Serve an index listing the given names
    pub fn with_index(self, names: &[&str]) -> Self {
        let entries: Vec<Value> = names
            .iter()
            .map(|n| json!({"name": n, "type": "registry:ui"}))
            .collect();
        self.with_json("index.json", Value::Array(entries))
    }

    pub fn with_status(mut self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(absolute(path), RawResponse::status(status, body));
        self
    }

    /// Number of requests made for `path`
    pub fn hits(&self, path: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .get(&absolute(path))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl RegistryTransport for FixtureTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, RegistryError> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(self
            .responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| RawResponse::status(404, "")))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

fn absolute(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{BASE_URL}/{}", path.trim_start_matches('/'))
    }
}

/// Client over `transport` with a fresh cache
pub fn client(transport: FixtureTransport) -> (RegistryClient, Arc<FixtureTransport>) {
    init_test_logging();

    let transport = Arc::new(transport);
    let client = RegistryClient::with_transport(
        RegistryConfig::default().with_base_url(BASE_URL),
        transport.clone(),
        Arc::new(FetchCache::new()),
    );
    (client, transport)
}
