use std::path::PathBuf;

/// Environment-driven configuration. A missing auth provider does not stop
/// the app; it switches the whole client into degraded mode instead.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the jobs/contracts/applications backend.
    pub api_url: String,
    /// Base URL of the identity/storage provider, if configured.
    pub auth_url: Option<String>,
    /// Anonymous API key for the identity/storage provider.
    pub auth_key: Option<String>,
    /// Location of the local durable cache.
    pub cache_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Config {
        let api_url = std::env::var("COSECHA_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| normalize_url(&v))
            .unwrap_or_else(|| "http://localhost:8000".to_string());

        let auth_url = std::env::var("COSECHA_AUTH_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| normalize_url(&v));
        let auth_key = std::env::var("COSECHA_AUTH_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let cache_path = std::env::var("COSECHA_CACHE_PATH")
            .unwrap_or_else(|_| "cosecha.db".to_string())
            .into();

        Config { api_url, auth_url, auth_key, cache_path }
    }

    /// Both provider settings present. Everything auth- or storage-related
    /// checks this before touching the network.
    pub fn is_configured(&self) -> bool {
        self.auth_url.is_some() && self.auth_key.is_some()
    }

    pub fn auth(&self) -> Option<(&str, &str)> {
        match (&self.auth_url, &self.auth_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}

/// Deployment configs often hold a bare hostname; assume https there.
fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}
