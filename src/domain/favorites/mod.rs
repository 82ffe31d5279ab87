//! Critical Favorites Invariants:
//!
//! 1. At most one entry per movie id
//! 2. Insertion order is preserved
//! 3. Lists are keyed per user and never deleted on sign-out
//! 4. Entries are copies, never references into the remote cache

pub mod entity;

pub use entity::{
    favorites_key, FavoritesList, ANONYMOUS_FAVORITES_KEY, FAVORITES_KEY_PREFIX,
};

use crate::domain::{DomainError, DomainResult};

/// Validates a list read back from storage.
pub fn validate_favorites(list: &FavoritesList) -> DomainResult<()> {
    let movies = list.movies();
    for (idx, movie) in movies.iter().enumerate() {
        if movies[..idx].iter().any(|m| m.id == movie.id) {
            return Err(DomainError::InvariantViolation(format!(
                "Duplicate favorite movie id {}",
                movie.id
            )));
        }
    }
    Ok(())
}
