use crate::config::{is_dot_segment, Config};
use crate::types::StatusResponse;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch status: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API returned non-OK status: {0}")]
    Status(StatusCode),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("status URL cannot carry an instance path: {0}")]
    InvalidUrl(Url),
    #[error("instance name {0:?} cannot be used as a URL path segment")]
    InvalidInstance(String),
}

/// Source of the release number an instance currently reports.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch(&self, instance: &str) -> Result<String, FetchError>;
}

/// Reads `releaseNumber` from the public instance status API.
pub struct HttpStatusFetcher {
    client: reqwest::Client,
    base_url: Url,
    locale: String,
}

impl HttpStatusFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.status_url.clone(),
            locale: config.locale.clone(),
        })
    }

    /// `{base}/api/instances/{instance}/status/preview?locale={locale}`
    pub fn status_url(&self, instance: &str) -> Result<Url, FetchError> {
        if is_dot_segment(instance) {
            return Err(FetchError::InvalidInstance(instance.to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["api", "instances", instance, "status", "preview"]);
        url.query_pairs_mut().clear().append_pair("locale", &self.locale);
        Ok(url)
    }
}

#[async_trait]
impl StatusFetcher for HttpStatusFetcher {
    async fn fetch(&self, instance: &str) -> Result<String, FetchError> {
        let url = self.status_url(instance)?;
        debug!(%instance, %url, "requesting instance status");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        let status: StatusResponse = serde_json::from_slice(&body)?;
        Ok(status.release_number)
    }
}
