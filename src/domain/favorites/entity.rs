use serde::{Deserialize, Serialize};

use crate::domain::movie::MovieSummary;
use crate::domain::user::AuthenticatedUser;

/// Key prefix of every per-user favorites list.
pub const FAVORITES_KEY_PREFIX: &str = "favorites:";

/// Key used when nobody is signed in.
pub const ANONYMOUS_FAVORITES_KEY: &str = "favorites:anonymous";

/// Derives the storage key of the favorites list visible to `user`.
pub fn favorites_key(user: Option<&AuthenticatedUser>) -> String {
    match user {
        Some(user) => format!("{}{}", FAVORITES_KEY_PREFIX, user.id),
        None => ANONYMOUS_FAVORITES_KEY.to_string(),
    }
}

/// Ordered, id-unique list of favorite movies.
///
/// All operations return a new list; an existing value is never mutated
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesList {
    movies: Vec<MovieSummary>,
}

impl FavoritesList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list keeping the first occurrence of every id.
    pub fn from_movies(movies: Vec<MovieSummary>) -> Self {
        let mut unique: Vec<MovieSummary> = Vec::with_capacity(movies.len());
        for movie in movies {
            if !unique.iter().any(|m| m.id == movie.id) {
                unique.push(movie);
            }
        }
        Self { movies: unique }
    }

    pub fn contains(&self, movie_id: i64) -> bool {
        self.movies.iter().any(|m| m.id == movie_id)
    }

    /// Removes the movie if present, appends it otherwise.
    pub fn toggled(&self, movie: &MovieSummary) -> Self {
        if self.contains(movie.id) {
            self.without(movie.id)
        } else {
            let mut movies = self.movies.clone();
            movies.push(movie.clone());
            Self { movies }
        }
    }

    pub fn without(&self, movie_id: i64) -> Self {
        Self {
            movies: self
                .movies
                .iter()
                .filter(|m| m.id != movie_id)
                .cloned()
                .collect(),
        }
    }

    pub fn movies(&self) -> &[MovieSummary] {
        &self.movies
    }

    pub fn into_movies(self) -> Vec<MovieSummary> {
        self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64) -> MovieSummary {
        MovieSummary::new(id, format!("Movie {}", id))
    }

    #[test]
    fn test_key_for_user_and_anonymous() {
        let user = AuthenticatedUser::new("abc".into(), "a@b.c".into(), "A".into());
        assert_eq!(favorites_key(Some(&user)), "favorites:abc");
        assert_eq!(favorites_key(None), "favorites:anonymous");
    }

    #[test]
    fn test_toggle_appends_at_end() {
        let list = FavoritesList::from_movies(vec![movie(1), movie(2)]);
        let next = list.toggled(&movie(3));
        let ids: Vec<i64> = next.movies().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        // Original untouched
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_toggle_twice_restores_list() {
        let list = FavoritesList::from_movies(vec![movie(4), movie(9), movie(2)]);
        for id in [4, 9, 2, 11] {
            let round_trip = list.toggled(&movie(id)).toggled(&movie(id));
            let expected: Vec<i64> = list
                .movies()
                .iter()
                .map(|m| m.id)
                .filter(|m| *m != id)
                .collect();
            let actual: Vec<i64> = round_trip
                .movies()
                .iter()
                .map(|m| m.id)
                .filter(|m| *m != id)
                .collect();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_from_movies_drops_duplicate_ids() {
        let list = FavoritesList::from_movies(vec![movie(1), movie(1), movie(2)]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_without_missing_id_is_noop() {
        let list = FavoritesList::from_movies(vec![movie(1)]);
        assert_eq!(list.without(42), list);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let list = FavoritesList::from_movies(vec![movie(1)]);
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.is_array());
    }
}
