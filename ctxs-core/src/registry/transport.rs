//! Registry transport - abstraction over the HTTP GET that loads documents
//!
//! The resolver only ever needs "GET this URL and give me the status and
//! body". Keeping that behind a trait lets tests serve fixtures from
//! memory while production goes through `reqwest`.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::error::RegistryError;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Reason phrase sent by the server, if any
    pub reason: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            reason: Some("OK".to_string()),
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for registry transports
///
/// Implementations report transport-level failures as
/// [`RegistryError::Network`]; HTTP status handling happens in
/// [`fetch_json`] so every transport classifies errors the same way.
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, RegistryError>;

    /// Transport identifier for logging/debugging
    fn name(&self) -> &'static str;
}

/// GET `url` and decode the body as JSON, classifying non-2xx statuses
pub async fn fetch_json(
    transport: &dyn RegistryTransport,
    url: &str,
) -> Result<Value, RegistryError> {
    debug!(transport = transport.name(), "GET {}", url);
    let response = transport.get(url).await?;

    if !response.is_success() {
        return Err(classify_status(url, &response));
    }

    serde_json::from_str(&response.body).map_err(|e| RegistryError::InvalidJson {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Map a non-2xx response to an error
pub fn classify_status(url: &str, response: &RawResponse) -> RegistryError {
    let url = url.to_string();
    match response.status {
        401 => RegistryError::Unauthorized { url },
        403 => RegistryError::Forbidden { url },
        404 => RegistryError::NotFound { url },
        status => {
            let server_error = serde_json::from_str::<Value>(&response.body)
                .ok()
                .and_then(|body| match body.get("error") {
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                    None => None,
                });

            let message = server_error
                .or_else(|| response.reason.clone().filter(|r| !r.is_empty()))
                .or_else(|| default_status_message(status).map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {status}"));

            RegistryError::Http {
                url,
                status,
                message,
            }
        }
    }
}

fn default_status_message(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("Bad request"),
        401 => Some("Unauthorized"),
        403 => Some("Forbidden"),
        404 => Some("Not found"),
        500 => Some("Internal server error"),
        _ => None,
    }
}

/// `reqwest`-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client with the given timeout and optional proxy
    pub fn new(timeout: Duration, proxy: Option<&str>) -> Result<Self, RegistryError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("ctxs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout);

        if let Some(proxy_url) = proxy {
            debug!("Routing registry requests through proxy {}", proxy_url);
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| RegistryError::InvalidUrl {
                url: proxy_url.to_string(),
                message: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| RegistryError::Network {
            url: String::new(),
            message: format!("Failed to create HTTP client: {e}"),
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RegistryTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, RegistryError> {
        let network_error = |e: reqwest::Error| RegistryError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(network_error)?;

        let status = response.status();
        let reason = status.canonical_reason().map(str::to_string);
        let body = response.text().await.map_err(network_error)?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
