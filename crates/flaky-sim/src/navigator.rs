//! Page navigation
//!
//! Navigation is done only for its side effect of opening the page. The
//! response is discarded and never feeds the pass/fail decision.

use crate::error::NavigationError;
use async_trait::async_trait;
use std::time::Duration;

/// Opens a target before a trial runs
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Open `url`; an error means the page could not be reached at all
    async fn navigate(&self, url: &str) -> Result<(), NavigationError>;
}

/// Navigator that fetches the page over HTTP
#[derive(Debug, Clone)]
pub struct HttpNavigator {
    client: reqwest::Client,
}

impl HttpNavigator {
    /// Default request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self, NavigationError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, NavigationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NavigationError {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Navigator for HttpNavigator {
    async fn navigate(&self, url: &str) -> Result<(), NavigationError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NavigationError {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!("Opened {} (ignored status {})", url, response.status());
        Ok(())
    }
}

/// Navigator that does no I/O
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNavigator;

#[async_trait]
impl Navigator for OfflineNavigator {
    async fn navigate(&self, url: &str) -> Result<(), NavigationError> {
        tracing::debug!("Offline navigation to {}", url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_navigation_always_succeeds() {
        let navigator = OfflineNavigator;
        assert!(navigator.navigate("https://en.wikipedia.org").await.is_ok());
        assert!(navigator.navigate("not a url").await.is_ok());
    }

    #[tokio::test]
    async fn test_http_navigation_rejects_bad_url() {
        let navigator = HttpNavigator::new().unwrap();
        let err = navigator.navigate("not a url").await.unwrap_err();
        assert_eq!(err.url, "not a url");
    }
}
