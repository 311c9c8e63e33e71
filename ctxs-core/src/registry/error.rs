//! Registry error types with messages that point at the offending URL
//!
//! Every error is `Clone` because a failed fetch is cached and handed to
//! every caller that asks for the same URL afterwards.

use thiserror::Error;

/// A fetched document did not match the registry schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The document could not be deserialized into the expected shape
    #[error("Invalid registry document: {0}")]
    Schema(String),

    /// An item was declared with an empty name
    #[error("Registry item name must not be empty")]
    EmptyName,

    /// A `registry:file` or `registry:page` file without a target
    #[error("File '{path}' of type '{file_type}' in item '{item}' requires a target")]
    MissingTarget {
        item: String,
        path: String,
        file_type: String,
    },
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Schema(err.to_string())
    }
}

/// Errors raised while fetching and resolving registry items
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    #[error("The registry document at {url} is invalid.\n{source}")]
    Validation {
        url: String,
        #[source]
        source: ValidationError,
    },

    #[error("The component at {url} was not found.\nIt may not exist at the registry. Please make sure it is a valid component.")]
    NotFound { url: String },

    #[error("You are not authorized to access the component at {url}.\nIf this is a remote registry, you may need to authenticate.")]
    Unauthorized { url: String },

    #[error("You do not have access to the component at {url}.\nIf this is a remote registry, you may need to authenticate or a token.")]
    Forbidden { url: String },

    #[error("Failed to fetch from {url} (HTTP {status}).\n{message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Failed to reach {url}: {message}")]
    Network { url: String, message: String },

    #[error("Response from {url} is not valid JSON: {message}")]
    InvalidJson { url: String, message: String },

    #[error("Invalid registry URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("None of the requested components could be resolved: {}", names.join(", "))]
    NothingResolved { names: Vec<String> },
}

impl RegistryError {
    /// URL the error is about, when there is exactly one
    pub fn url(&self) -> Option<&str> {
        match self {
            RegistryError::Validation { url, .. }
            | RegistryError::NotFound { url }
            | RegistryError::Unauthorized { url }
            | RegistryError::Forbidden { url }
            | RegistryError::Http { url, .. }
            | RegistryError::Network { url, .. }
            | RegistryError::InvalidJson { url, .. }
            | RegistryError::InvalidUrl { url, .. } => Some(url),
            RegistryError::NothingResolved { .. } => None,
        }
    }

    /// HTTP status behind the error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            RegistryError::NotFound { .. } => Some(404),
            RegistryError::Unauthorized { .. } => Some(401),
            RegistryError::Forbidden { .. } => Some(403),
            RegistryError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a caller should prompt for credentials and retry
    pub fn needs_auth(&self) -> bool {
        matches!(
            self,
            RegistryError::Unauthorized { .. } | RegistryError::Forbidden { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }
}
