// src/integrations/tmdb/client.rs
//
// TMDb REST Integration
//
// ARCHITECTURE:
// - Read-only HTTP client for the popular-movies listing
// - Returns the raw page shape; mapping lives in `mapping.rs`
// - Transport failures surface as "Network request failed" errors so the
//   query layer grants them the larger retry budget

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// One movie as returned by `/3/movie/popular`. Every field may be missing
/// or null upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbMovie {
    /// Kept loose so a non-numeric id drops one entry, not the whole page.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl TmdbMovie {
    /// The id, when upstream sent an integer that fits in `i64`.
    pub fn numeric_id(&self) -> Option<i64> {
        match self.id.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            _ => None,
        }
    }
}

/// Page envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopularMoviesPage {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub results: Option<Vec<TmdbMovie>>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u32>,
}

/// Error body TMDb sends with non-2xx responses
#[derive(Debug, Deserialize)]
struct TmdbErrorBody {
    status_message: Option<String>,
}

/// Anything that can produce a page of popular movies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn popular_movies(&self, language: &str, page: u32) -> AppResult<PopularMoviesPage>;
}

/// TMDb API client
pub struct TmdbClient {
    base_url: String,
    api_key: Option<String>,
    http_client: Client,
}

impl TmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http_client,
        })
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(
            config.tmdb_base_url.clone(),
            config.tmdb_api_key.clone(),
            config.request_timeout(),
        )
    }

    fn popular_url(&self) -> String {
        format!("{}/3/movie/popular", self.base_url)
    }
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn popular_movies(&self, language: &str, page: u32) -> AppResult<PopularMoviesPage> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("No TMDb API key configured".to_string())
        })?;

        let page_param = page.to_string();
        let response = self
            .http_client
            .get(self.popular_url())
            .header(header::ACCEPT, "application/json")
            .query(&[
                ("api_key", api_key),
                ("language", language),
                ("page", page_param.as_str()),
            ])
            .send()
            .await
            .map_err(AppError::network_request_failed)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<TmdbErrorBody>()
                .await
                .ok()
                .and_then(|body| body.status_message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

            return Err(AppError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let page: PopularMoviesPage = response
            .json()
            .await
            .map_err(|e| AppError::Other(format!("Failed to parse TMDb response: {}", e)))?;

        log::debug!(
            "TMDb popular page {:?} returned {} results",
            page.page,
            page.results.as_ref().map(Vec::len).unwrap_or(0)
        );

        Ok(page)
    }
}
