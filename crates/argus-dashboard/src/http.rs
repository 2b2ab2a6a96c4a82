//! REST client for the scraping backend.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use argus_common::error::{ArgusError, Result};
use argus_common::models::{
    BasicStats, EnhancedStats, GraphSnapshot, MediaSnapshot, MediaStats, SearchRequest,
    SearchStarted,
};
use argus_common::transport::Backend;

pub const START_SEARCH_PATH: &str = "/api/start-search";
pub const START_COMPREHENSIVE_SEARCH_PATH: &str = "/api/start-comprehensive-search";
const STATS_PATH: &str = "/api/stats";
const ENHANCED_STATS_PATH: &str = "/api/enhanced-stats";
const MEDIA_DATA_PATH: &str = "/api/media-data";
const MEDIA_STATS_PATH: &str = "/api/media-stats";
const GRAPH_DATA_PATH: &str = "/api/graph-data";

/// HTTP client bound to a single backend origin.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
    start_search_path: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ArgusError::Config(format!("Invalid backend URL {}: {}", base_url, e)))?;

        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| ArgusError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            start_search_path: START_SEARCH_PATH.to_string(),
        })
    }

    /// Use a different start-search endpoint (the comprehensive OSINT variant).
    pub fn with_start_search_path(mut self, path: impl Into<String>) -> Self {
        self.start_search_path = path.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve a path against the backend origin.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| ArgusError::Config(format!("Invalid endpoint path {}: {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(ArgusError::Status {
                status: resp.status().as_u16(),
                path: path.to_string(),
            });
        }
        let body = resp.json::<T>().await?;
        debug!(path, "backend GET succeeded");
        Ok(body)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self), fields(keywords = request.keywords.len()))]
    async fn start_search(&self, request: &SearchRequest) -> Result<SearchStarted> {
        let url = self.endpoint(&self.start_search_path)?;
        let resp = self.client.post(url).json(request).send().await?;
        if !resp.status().is_success() {
            return Err(ArgusError::Status {
                status: resp.status().as_u16(),
                path: self.start_search_path.clone(),
            });
        }
        let started = resp.json::<SearchStarted>().await?;
        if started.search_id.is_empty() {
            return Err(ArgusError::Protocol("start-search reply carried no search_id".into()));
        }
        Ok(started)
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> Result<BasicStats> {
        self.get_json(STATS_PATH).await
    }

    #[instrument(skip(self))]
    async fn enhanced_stats(&self) -> Result<EnhancedStats> {
        self.get_json(ENHANCED_STATS_PATH).await
    }

    #[instrument(skip(self))]
    async fn media_data(&self) -> Result<MediaSnapshot> {
        self.get_json(MEDIA_DATA_PATH).await
    }

    #[instrument(skip(self))]
    async fn media_stats(&self) -> Result<MediaStats> {
        self.get_json(MEDIA_STATS_PATH).await
    }

    #[instrument(skip(self))]
    async fn graph_data(&self) -> Result<GraphSnapshot> {
        self.get_json(GRAPH_DATA_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_against_origin() {
        let backend = HttpBackend::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            backend.endpoint(STATS_PATH).unwrap().as_str(),
            "http://localhost:5000/api/stats"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = HttpBackend::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ArgusError::Config(_)));
    }

    #[test]
    fn test_comprehensive_path_override() {
        let backend = HttpBackend::new("http://localhost:5000", Duration::from_secs(5))
            .unwrap()
            .with_start_search_path(START_COMPREHENSIVE_SEARCH_PATH);
        assert_eq!(
            backend.endpoint(&backend.start_search_path).unwrap().path(),
            "/api/start-comprehensive-search"
        );
    }
}
