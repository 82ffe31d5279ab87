// src/services/popular_movies_service.rs
//
// Popular movies listing over the query cache
//
// RULES:
// - One cache entry per (language, page)
// - Raw TMDb payloads never leave this service
// - Failures are reported through state, never returned as Err

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::MovieSummary;
use crate::events::{EventBus, PopularMoviesFetched, QueryFetchFailed};
use crate::integrations::tmdb::{map_popular_page, MovieSource};
use crate::services::query::{QueryCache, QueryKey, QueryObserver, QueryState};

pub type MoviesState = QueryState<Vec<MovieSummary>>;

pub struct PopularMoviesService {
    source: Arc<dyn MovieSource>,
    cache: QueryCache<Vec<MovieSummary>>,
    event_bus: Arc<EventBus>,
    language: String,
    page: u32,
}

impl PopularMoviesService {
    pub fn new(
        source: Arc<dyn MovieSource>,
        cache: QueryCache<Vec<MovieSummary>>,
        event_bus: Arc<EventBus>,
        language: impl Into<String>,
        page: u32,
    ) -> Self {
        Self {
            source,
            cache,
            event_bus,
            language: language.into(),
            page,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        source: Arc<dyn MovieSource>,
        cache: QueryCache<Vec<MovieSummary>>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self::new(source, cache, event_bus, config.language.clone(), config.popular_page)
    }

    /// `["movie", "popular", <language>, <page>]`
    pub fn query_key(&self) -> QueryKey {
        QueryKey::new([
            "movie".to_string(),
            "popular".to_string(),
            self.language.clone(),
            self.page.to_string(),
        ])
    }

    pub fn cache(&self) -> &QueryCache<Vec<MovieSummary>> {
        &self.cache
    }

    /// Cached listing when fresh, otherwise fetched.
    pub async fn popular_movies(&self) -> MoviesState {
        let key = self.query_key();
        let state = self.cache.fetch(&key, || self.load()).await;
        self.report(&key, &state);
        state
    }

    /// Forces a fetch; joins one already in flight.
    pub async fn refresh(&self) -> MoviesState {
        let key = self.query_key();
        let state = self.cache.refetch(&key, || self.load()).await;
        self.report(&key, &state);
        state
    }

    pub fn state(&self) -> MoviesState {
        self.cache.state(&self.query_key())
    }

    /// Mounts the listing; while the handle lives the entry is kept and
    /// eligible for focus/reconnect refetches.
    pub fn observe(&self) -> QueryObserver<Vec<MovieSummary>> {
        self.cache.observe(&self.query_key())
    }

    /// Refetches when the listing is mounted and stale. `None` when nothing ran.
    pub async fn on_reconnect(&self) -> Option<MoviesState> {
        let key = self.query_key();
        if !self.cache.keys_to_refetch_on_reconnect().contains(&key) {
            return None;
        }
        log::debug!("Connectivity restored, refetching {}", key);
        Some(self.refresh().await)
    }

    pub async fn on_window_focus(&self) -> Option<MoviesState> {
        let key = self.query_key();
        if !self.cache.keys_to_refetch_on_focus().contains(&key) {
            return None;
        }
        log::debug!("Window focused, refetching {}", key);
        Some(self.refresh().await)
    }

    fn load(
        &self,
    ) -> impl std::future::Future<Output = crate::error::AppResult<Vec<MovieSummary>>> + '_ {
        async move {
            let page = self.source.popular_movies(&self.language, self.page).await?;
            let movies = map_popular_page(page);
            self.event_bus.emit(PopularMoviesFetched::new(
                self.language.clone(),
                self.page,
                movies.len(),
            ));
            Ok(movies)
        }
    }

    fn report(&self, key: &QueryKey, state: &MoviesState) {
        if let Some(error) = state.error.as_ref().filter(|_| state.is_error()) {
            self.event_bus.emit(QueryFetchFailed::new(
                key.to_string(),
                state.failure_count,
                error.message.clone(),
            ));
        }
    }
}
