//! Client configuration

/// Client configuration for connecting to the Roost API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Pre-issued bearer token, seeded into the session on client creation
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Falls back to defaults when a variable is unset:
    /// - `ROOST_API_URL` (default `http://localhost:8080`)
    /// - `ROOST_API_TOKEN` (default none)
    /// - `ROOST_API_TIMEOUT` in seconds (default 30)
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ROOST_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            token: std::env::var("ROOST_API_TOKEN").ok(),
            timeout: std::env::var("ROOST_API_TIMEOUT")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
