//! Client configuration.

use std::time::Duration;

/// Fixed request timeout applied to every API call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for talking to the Morsel API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `"https://api.morsel.example"`.
    pub base_url: String,

    /// Timeout applied to each request. A timeout surfaces as a generic
    /// connectivity error, not a distinct state.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the given base URL with the default
    /// request timeout. A trailing slash on the URL is trimmed.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();

        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slashes() {
        let config = ClientConfig::new("https://api.morsel.example/");

        assert_eq!(config.base_url, "https://api.morsel.example");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }
}
