//! Backend connection settings

use crate::error::{ApiError, ApiResult};

/// Used when no environment variable is set
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Primary environment variable for the backend URL
pub const API_URL_ENV: &str = "SCHEMAFORGE_API_URL";

/// Variable the web front end reads; honoured as a fallback
pub const LEGACY_API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";

/// Where the backend lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the base URL from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the base URL through `lookup`; blank values are skipped
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = [API_URL_ENV, LEGACY_API_URL_ENV]
            .iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty());

        match base_url {
            Some(url) => Self::default().with_base_url(url),
            None => Self::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        let rest = self
            .base_url
            .strip_prefix("http://")
            .or_else(|| self.base_url.strip_prefix("https://"))
            .ok_or_else(|| {
                ApiError::config(format!(
                    "Base URL must start with http:// or https://, got '{}'",
                    self.base_url
                ))
            })?;

        if rest.is_empty() {
            return Err(ApiError::config("Base URL has no host"));
        }

        if self.timeout_secs == 0 {
            return Err(ApiError::config("Timeout must be greater than 0"));
        }

        Ok(())
    }
}
