//! wpick-rest: WordPress REST search source for wpick.
//!
//! [`RestSource`] implements [`wpick_core::SearchSource`] with a single
//! `GET` per search against the site's REST API, over a pooled `hyper`
//! client. Transport failures, non-2xx statuses, undecodable bodies, and
//! timeouts are all reported as [`LoadError`] values so the loader can turn
//! them into empty deliveries.

pub mod endpoint;

pub use endpoint::Endpoint;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::header::{ACCEPT, USER_AGENT};
use hyper::{Request, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use std::time::Duration;
use thiserror::Error;
use wpick_core::config::{Config, SourceConfig};
use wpick_core::{ConfigError, Item, ItemShape, LoadError, SearchSource};

const AGENT: &str = concat!("wpick/", env!("CARGO_PKG_VERSION"));

/// Construction-time failures. Request-time failures are [`LoadError`]s.
#[derive(Debug, Error)]
pub enum RestError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid site URL {url:?}: {reason}")]
    Url { url: String, reason: String },
}

pub struct RestSource {
    client: Client<HttpConnector, Empty<Bytes>>,
    endpoint: Endpoint,
    shape: ItemShape,
    timeout: Duration,
}

impl RestSource {
    pub fn new(site: &str, source: &SourceConfig, timeout: Duration) -> Result<Self, RestError> {
        if !site.starts_with("http://") {
            return Err(ConfigError::Scheme(site.to_string()).into());
        }
        site.parse::<Uri>().map_err(|e| RestError::Url {
            url: site.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self {
            client,
            endpoint: Endpoint::new(site, source),
            shape: source.shape(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, RestError> {
        Self::new(
            &config.site.base_url,
            &config.picker.source,
            config.site.timeout(),
        )
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn get(&self, url: &str) -> Result<Vec<Item>, LoadError> {
        let uri = url
            .parse::<Uri>()
            .map_err(|e| LoadError::Network(e.to_string()))?;
        let req = Request::get(uri)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, AGENT)
            .body(Empty::<Bytes>::new())
            .map_err(|e| LoadError::Network(e.to_string()))?;

        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?
            .to_bytes();

        let payload: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| LoadError::Parse(e.to_string()))?;
        self.shape.decode_payload(payload)
    }
}

#[async_trait]
impl SearchSource for RestSource {
    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<Item>, LoadError> {
        let url = self.endpoint.search_url(query, per_page);
        tracing::debug!(url = %url, "GET");
        match tokio::time::timeout(self.timeout, self.get(&url)).await {
            Ok(result) => result,
            Err(_) => Err(LoadError::Timeout(millis(self.timeout))),
        }
    }
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_millis_saturate() {
        assert_eq!(millis(Duration::from_millis(50)), 50);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn https_site_rejected() {
        let err = RestSource::new("https://example.com", &SourceConfig::Posts, Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, RestError::Config(ConfigError::Scheme(_))));
    }

    #[tokio::test]
    async fn unreachable_site_is_network_error() {
        // Port 9 (discard) on localhost is closed on any sane test machine.
        let source =
            RestSource::new("http://127.0.0.1:9", &SourceConfig::Posts, Duration::from_secs(5)).unwrap();
        let err = source.search("x", 1).await.unwrap_err();
        assert!(matches!(err, LoadError::Network(_)), "got {err:?}");
    }
}
