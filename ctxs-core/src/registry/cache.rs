//! Fetch cache with request coalescing
//!
//! Maps a resolved URL to a shared future. The future is stored *before*
//! anyone awaits it, so callers racing on the same URL await the same
//! request, and callers arriving after it settles get the stored result.
//! Failures are stored too; only [`FetchCache::clear`] allows a retry.

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use super::error::RegistryError;

/// Terminal result of one fetch, shared between every caller
pub type FetchResult = Result<Arc<Value>, RegistryError>;

type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// URL-keyed cache of in-flight and completed fetches
#[derive(Default)]
pub struct FetchCache {
    entries: Mutex<HashMap<String, SharedFetch>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Await the fetch for `url`, starting it with `fetch` if none exists
    ///
    /// `fetch` is only invoked by the first caller for a URL.
    pub async fn get_or_fetch<F, Fut>(&self, url: &str, fetch: F) -> FetchResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult> + Send + 'static,
    {
        let pending = {
            let mut entries = self.lock();
            match entries.get(url) {
                Some(existing) => {
                    debug!("Fetch cache hit: {}", url);
                    existing.clone()
                }
                None => {
                    debug!("Fetch cache miss: {}", url);
                    let shared = fetch().boxed().shared();
                    entries.insert(url.to_string(), shared.clone());
                    shared
                }
            }
        };

        pending.await
    }

    /// Drop every cached entry, pending or settled
    pub fn clear(&self) {
        let mut entries = self.lock();
        debug!("Clearing fetch cache ({} entries)", entries.len());
        entries.clear();
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The map stays consistent even if a holder panicked, so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, HashMap<String, SharedFetch>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for FetchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCache")
            .field("entries", &self.len())
            .finish()
    }
}
