use std::fmt::Display;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::types::{
    GameDetails, GameSummary, Page, Platform, PlatformDetails, Results, Screenshot, Trailer,
};
use crate::config::AppConfig;

/// Public RAWG API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.rawg.io/api";
/// Entries requested per page for game listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Failures raised by [`CatalogClient`].
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Transport error, non-success status or undecodable body.
    #[error("failed to fetch {resource}: {reason}")]
    FetchFailed {
        /// Short name of the requested resource.
        resource: &'static str,
        /// Human readable cause.
        reason: String,
    },
    /// The configured base URL cannot carry request paths.
    #[error("invalid catalog base url {0:?}")]
    InvalidBaseUrl(String),
}

/// Read-only client for the game catalog service.
///
/// Requests are not retried, cached or rate limited.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    page_size: u32,
}

impl CatalogClient {
    /// Create a client for `base_url`, passing `api_key` with every request.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, CatalogError> {
        let parsed =
            Url::parse(base_url).map_err(|_| CatalogError::InvalidBaseUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: parsed,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Build a client from application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let client = Self::new(&config.api_base_url, config.api_key.clone())?;
        Ok(client.with_page_size(config.page_size))
    }

    /// Override the number of entries requested per listing page.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Search games by name. `page` is sent as given; the service numbers pages from 1.
    pub async fn search_games(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Page<GameSummary>, CatalogError> {
        let url = self.endpoint(
            &["games"],
            &[
                ("search", query.to_string()),
                ("page", page.to_string()),
                ("page_size", self.page_size.to_string()),
            ],
        );
        self.get_json("games", url).await
    }

    /// Fetch the full record of a game.
    pub async fn game_details(&self, game_id: u64) -> Result<GameDetails, CatalogError> {
        let url = self.endpoint(&["games", &game_id.to_string()], &[]);
        self.get_json("game details", url).await
    }

    /// Fetch a game's screenshots. A payload without `results` yields an empty list.
    pub async fn game_screenshots(&self, game_id: u64) -> Result<Vec<Screenshot>, CatalogError> {
        let url = self.endpoint(&["games", &game_id.to_string(), "screenshots"], &[]);
        let envelope: Results<Screenshot> = self.get_json("screenshots", url).await?;
        Ok(envelope.results)
    }

    /// Fetch a game's trailers. A payload without `results` yields an empty list.
    pub async fn game_trailers(&self, game_id: u64) -> Result<Vec<Trailer>, CatalogError> {
        let url = self.endpoint(&["games", &game_id.to_string(), "movies"], &[]);
        let envelope: Results<Trailer> = self.get_json("trailers", url).await?;
        Ok(envelope.results)
    }

    /// Search platforms (consoles) by name.
    pub async fn search_platforms(&self, query: &str) -> Result<Page<Platform>, CatalogError> {
        let url = self.endpoint(&["platforms"], &[("search", query.to_string())]);
        self.get_json("platforms", url).await
    }

    /// Fetch the full record of a platform.
    pub async fn platform_details(
        &self,
        platform_id: u64,
    ) -> Result<PlatformDetails, CatalogError> {
        let url = self.endpoint(&["platforms", &platform_id.to_string()], &[]);
        self.get_json("platform details", url).await
    }

    /// Games ordered by how recently they were added to users' libraries.
    pub async fn trending_games(&self) -> Result<Page<GameSummary>, CatalogError> {
        let url = self.endpoint(
            &["games"],
            &[
                ("ordering", "-added".to_string()),
                ("page_size", self.page_size.to_string()),
            ],
        );
        self.get_json("trending games", url).await
    }

    fn endpoint(&self, segments: &[&str], params: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        let mut path = url.path().trim_end_matches('/').to_string();
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }
        url.set_path(&path);

        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        url: Url,
    ) -> Result<T, CatalogError> {
        debug!(resource, path = url.path(), "Catalog request");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| fetch_failed(resource, err.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(resource, format!("unexpected status {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| fetch_failed(resource, err.without_url()))
    }
}

fn fetch_failed(resource: &'static str, reason: impl Display) -> CatalogError {
    let err = CatalogError::FetchFailed {
        resource,
        reason: reason.to_string(),
    };
    error!("Catalog request failed: {err}");
    err
}
