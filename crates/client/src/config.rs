/// Backend used when `API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// API client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub api_url: String,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var   | Default                 |
    /// |-----------|-------------------------|
    /// | `API_URL` | `http://localhost:8000` |
    pub fn from_env() -> Self {
        let api_url = std::env::var("API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        Self::new(api_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
