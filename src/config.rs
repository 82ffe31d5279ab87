// src/config.rs
//
// Application configuration
//
// Defaults mirror the production app; the environment may override them.
// The API key is never compiled in.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::integrations::auth::MockAuthConfig;
use crate::services::QueryOptions;

pub const ENV_API_KEY: &str = "MOVIEHUB_TMDB_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "TMDB_API_KEY";
pub const ENV_LANGUAGE: &str = "MOVIEHUB_LANGUAGE";
pub const ENV_DATABASE_PATH: &str = "MOVIEHUB_DATABASE_PATH";
pub const ENV_TMDB_BASE_URL: &str = "MOVIEHUB_TMDB_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub tmdb_base_url: String,

    #[serde(skip_serializing)]
    pub tmdb_api_key: Option<String>,

    pub language: String,
    pub popular_page: u32,
    pub image_base_url: String,

    /// `None` means `{data_dir}/moviehub/moviehub.db`
    pub database_path: Option<PathBuf>,

    pub request_timeout_secs: u64,

    /// How often the query cache is swept for unused entries
    pub gc_sweep_interval_secs: u64,

    pub query: QueryOptions,
    pub auth: MockAuthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tmdb_base_url: "https://api.themoviedb.org".to_string(),
            tmdb_api_key: None,
            language: "en-US".to_string(),
            popular_page: 1,
            image_base_url: "https://image.tmdb.org/t/p/w200".to_string(),
            database_path: None,
            request_timeout_secs: 30,
            gc_sweep_interval_secs: 60,
            query: QueryOptions::default(),
            auth: MockAuthConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with whatever the process environment provides.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.tmdb_api_key = non_empty(ENV_API_KEY).or_else(|| non_empty(ENV_API_KEY_FALLBACK));

        if let Some(language) = non_empty(ENV_LANGUAGE) {
            config.language = language;
        }
        if let Some(path) = non_empty(ENV_DATABASE_PATH) {
            config.database_path = Some(PathBuf::from(path));
        }
        if let Some(url) = non_empty(ENV_TMDB_BASE_URL) {
            config.tmdb_base_url = url;
        }

        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn gc_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.gc_sweep_interval_secs.max(1))
    }

    pub fn require_api_key(&self) -> AppResult<&str> {
        self.tmdb_api_key.as_deref().ok_or_else(|| {
            AppError::Configuration(format!(
                "No TMDb API key configured; set {} or {}",
                ENV_API_KEY, ENV_API_KEY_FALLBACK
            ))
        })
    }
}
