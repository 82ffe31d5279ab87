// src/application/state.rs

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::db::{
    create_connection_pool, get_connection, get_database_path, get_database_stats,
    initialize_database, verify_database_integrity,
};
use crate::domain::MovieSummary;
use crate::error::AppResult;
use crate::events::{create_event_bus, EventBus};
use crate::infrastructure::JsonStorage;
use crate::integrations::{AuthProvider, MockGoogleSignIn, MovieSource, TmdbClient};
use crate::repositories::{KeyValueRepository, SqliteKeyValueRepository};
use crate::services::{FavoritesService, PopularMoviesService, QueryCache, SessionManager};

/// Application state shared by every command.
/// All fields are Arc-wrapped for thread-safe sharing across commands.
pub struct AppState {
    pub config: AppConfig,
    pub event_bus: Arc<EventBus>,
    pub storage: Arc<JsonStorage>,
    pub session: Arc<SessionManager>,
    pub popular_movies: Arc<PopularMoviesService>,
    pub favorites: Arc<FavoritesService>,
    gc_task: Mutex<Option<JoinHandle<()>>>,
}

impl AppState {
    /// Wires services over the given backends and starts the cache sweep.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn init(
        config: AppConfig,
        kv: Arc<dyn KeyValueRepository>,
        auth: Arc<dyn AuthProvider>,
        source: Arc<dyn MovieSource>,
    ) -> Self {
        // 1. INFRASTRUCTURE
        let event_bus = Arc::new(create_event_bus());
        let storage = Arc::new(JsonStorage::new(kv, event_bus.clone()));

        // 2. SERVICES
        let session = Arc::new(SessionManager::new(storage.clone(), auth, event_bus.clone()));
        let cache: QueryCache<Vec<MovieSummary>> = QueryCache::new(config.query.clone());
        let popular_movies = Arc::new(PopularMoviesService::from_config(
            &config,
            source,
            cache.clone(),
            event_bus.clone(),
        ));
        let favorites = Arc::new(FavoritesService::new(
            storage.clone(),
            session.clone(),
            event_bus.clone(),
        ));

        // 3. BACKGROUND TASKS
        let gc_task = cache.spawn_gc_task(config.gc_sweep_interval());

        log::debug!(
            "Application state ready (language {}, page {})",
            config.language,
            config.popular_page
        );

        Self {
            config,
            event_bus,
            storage,
            session,
            popular_movies,
            favorites,
            gc_task: Mutex::new(Some(gc_task)),
        }
    }

    /// Production wiring: SQLite store, mock Google sign-in, TMDb client.
    pub fn open(config: AppConfig) -> AppResult<Self> {
        let db_path = match &config.database_path {
            Some(path) => path.clone(),
            None => get_database_path()?,
        };
        log::info!("Opening store at {}", db_path.display());

        let pool = Arc::new(create_connection_pool(&db_path)?);
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
            verify_database_integrity(&conn)?;

            let stats = get_database_stats(&conn)?;
            log::debug!(
                "Store has {} keys, {} favorites lists ({} bytes)",
                stats.key_count,
                stats.favorites_list_count,
                stats.size_bytes
            );
        }

        let kv: Arc<dyn KeyValueRepository> = Arc::new(SqliteKeyValueRepository::new(pool));
        let auth: Arc<dyn AuthProvider> = Arc::new(MockGoogleSignIn::new(config.auth.clone()));
        let source: Arc<dyn MovieSource> = Arc::new(TmdbClient::from_config(&config)?);

        Ok(Self::init(config, kv, auth, source))
    }

    /// Stops background work and drops cached remote data. Idempotent.
    pub fn shutdown(&self) {
        let task = self
            .gc_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
            log::debug!("Query cache sweep stopped");
        }
        self.popular_movies.cache().clear();
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        if let Some(task) = self
            .gc_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryKeyValueRepository;
    use crate::integrations::tmdb::MockMovieSource;

    #[tokio::test]
    async fn test_open_creates_store_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            database_path: Some(dir.path().join("nested").join("moviehub.db")),
            ..AppConfig::default()
        };

        let state = AppState::open(config).unwrap();

        assert!(dir.path().join("nested").join("moviehub.db").exists());
        assert!(state.session.current_user().is_none());
        state.shutdown();
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let state = AppState::init(
            AppConfig::default(),
            Arc::new(InMemoryKeyValueRepository::new()),
            Arc::new(MockGoogleSignIn::default()),
            Arc::new(MockMovieSource::new()),
        );

        state.shutdown();
        state.shutdown();

        assert!(state.gc_task.lock().unwrap().is_none());
    }
}
