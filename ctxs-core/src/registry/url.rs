//! Registry URL construction

use reqwest::Url;

use super::error::RegistryError;

/// Whether `path` parses as an absolute URL
pub fn is_url(path: &str) -> bool {
    Url::parse(path).is_ok()
}

/// Resolve a registry path against `base_url`
///
/// Relative paths are appended to the base. Absolute URLs pass through,
/// except that hosted-item URLs (`/chat/b/...`) get a `/json` suffix.
pub fn registry_url(base_url: &str, path: &str) -> Result<String, RegistryError> {
    match Url::parse(path) {
        Ok(mut url) => {
            if url.path().contains("/chat/b/") && !url.path().ends_with("/json") {
                let rewritten = format!("{}/json", url.path());
                url.set_path(&rewritten);
            }
            Ok(url.to_string())
        }
        Err(_) => {
            if base_url.is_empty() {
                return Err(RegistryError::InvalidUrl {
                    url: path.to_string(),
                    message: "no registry base URL configured".to_string(),
                });
            }
            Ok(format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            ))
        }
    }
}

/// Path of a named item inside a style namespace
pub fn item_path(style: &str, name: &str) -> String {
    format!("styles/{style}/{name}.json")
}
