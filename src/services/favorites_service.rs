// src/services/favorites_service.rs
//
// Per-user favorites
//
// RULES:
// - The active list lives under favorites:<user id> (favorites:anonymous
//   when signed out) and is re-derived on every call
// - Every change is one full-list write through JsonStorage
// - Without a session, reads report "not a favorite" and writes do nothing

use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::{favorites_key, validate_favorites, FavoritesList, MovieSummary};
use crate::error::AppResult;
use crate::events::{EventBus, FavoritesChanged};
use crate::infrastructure::JsonStorage;
use crate::services::session_service::SessionManager;

pub struct FavoritesService {
    storage: Arc<JsonStorage>,
    session: Arc<SessionManager>,
    event_bus: Arc<EventBus>,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FavoritesService {
    pub fn new(
        storage: Arc<JsonStorage>,
        session: Arc<SessionManager>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            storage,
            session,
            event_bus,
            write_lock: Mutex::new(()),
        }
    }

    /// Storage key of the list visible right now.
    pub fn storage_key(&self) -> String {
        favorites_key(self.session.current_user().as_ref())
    }

    fn load(&self, key: &str) -> FavoritesList {
        let movies: Vec<MovieSummary> = self.storage.get_json(key, Vec::new());
        FavoritesList::from_movies(movies)
    }

    /// The active user's favorites, in insertion order.
    pub fn favorites(&self) -> Vec<MovieSummary> {
        self.load(&self.storage_key()).into_movies()
    }

    pub fn is_favorite(&self, movie_id: i64) -> bool {
        let Some(user) = self.session.current_user() else {
            return false;
        };
        self.load(&favorites_key(Some(&user))).contains(movie_id)
    }

    /// Adds or removes `movie`. Returns whether it is a favorite afterwards.
    pub fn toggle_favorite(&self, movie: &MovieSummary) -> AppResult<bool> {
        self.update(|list| list.toggled(movie), movie.id)
    }

    /// Removes `movie_id` when present.
    pub fn remove_favorite(&self, movie_id: i64) -> AppResult<()> {
        self.update(|list| list.without(movie_id), movie_id)?;
        Ok(())
    }

    /// Pairs each movie with its favorite flag.
    pub fn annotate(&self, movies: &[MovieSummary]) -> Vec<(MovieSummary, bool)> {
        let list = match self.session.current_user() {
            Some(user) => self.load(&favorites_key(Some(&user))),
            None => FavoritesList::new(),
        };
        movies
            .iter()
            .map(|movie| (movie.clone(), list.contains(movie.id)))
            .collect()
    }

    fn update<F>(&self, change: F, movie_id: i64) -> AppResult<bool>
    where
        F: FnOnce(&FavoritesList) -> FavoritesList,
    {
        let Some(user) = self.session.current_user() else {
            log::debug!("Favorites change for {} ignored: no session", movie_id);
            return Ok(false);
        };

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let key = favorites_key(Some(&user));
        let current = self.load(&key);
        let next = change(&current);

        if next == current {
            return Ok(current.contains(movie_id));
        }

        validate_favorites(&next)?;
        self.storage.set_json(&key, next.movies())?;

        let is_favorite = next.contains(movie_id);
        log::info!(
            "Movie {} {} favorites ({} total)",
            movie_id,
            if is_favorite { "added to" } else { "removed from" },
            next.len()
        );
        self.event_bus
            .emit(FavoritesChanged::new(key, movie_id, is_favorite, next.len()));
        Ok(is_favorite)
    }
}
