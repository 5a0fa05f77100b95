use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Public oEmbed endpoint of the audio service
pub const OEMBED_URL: &str = "https://soundcloud.com/oembed";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("title lookup is disabled")]
    Disabled,
    #[error("title request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("response carried no title")]
    MissingTitle,
}

/// Best-effort display title lookup for a track locator
#[async_trait]
pub trait TitleResolver: Send + Sync {
    async fn resolve(&self, locator: &str) -> Result<String, LookupError>;
}

/// Resolves titles through the service's oEmbed endpoint
pub struct OEmbedResolver {
    http: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    #[serde(default)]
    title: Option<String>,
}

impl OEmbedResolver {
    pub fn new(timeout: Duration) -> Result<Self, LookupError> {
        Self::with_endpoint(OEMBED_URL, timeout)
    }

    pub fn with_endpoint(endpoint: &str, timeout: Duration) -> Result<Self, LookupError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl TitleResolver for OEmbedResolver {
    async fn resolve(&self, locator: &str) -> Result<String, LookupError> {
        let response: OEmbedResponse = self
            .http
            .get(&self.endpoint)
            .query(&[("format", "json"), ("url", locator)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(LookupError::MissingTitle)
    }
}

/// Resolver used when lookups are switched off
pub struct NoLookup;

#[async_trait]
impl TitleResolver for NoLookup {
    async fn resolve(&self, _locator: &str) -> Result<String, LookupError> {
        Err(LookupError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_lookup_always_fails() {
        let err = NoLookup.resolve("https://soundcloud.com/a/b").await.unwrap_err();
        assert!(matches!(err, LookupError::Disabled));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error_not_a_panic() {
        let resolver =
            OEmbedResolver::with_endpoint("http://127.0.0.1:9/oembed", Duration::from_millis(200))
                .expect("client builds");
        let result = resolver.resolve("https://soundcloud.com/a/b").await;
        assert!(matches!(result, Err(LookupError::Http(_))));
    }
}
