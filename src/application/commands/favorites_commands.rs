// src/application/commands/favorites_commands.rs
//
// Favorites Command Handlers

use crate::application::dto::{FavoriteToggledDto, FavoritesDto, MovieDto};
use crate::application::error_handling::{ErrorResponse, ToErrorResponse};
use crate::application::state::AppState;
use crate::domain::MovieSummary;

pub async fn list_favorites(state: &AppState) -> Result<FavoritesDto, String> {
    let movies = state
        .favorites
        .favorites()
        .iter()
        .map(|movie| MovieDto::from_summary(movie, &state.config.image_base_url, true))
        .collect();

    Ok(FavoritesDto {
        storage_key: state.favorites.storage_key(),
        movies,
    })
}

/// Finds the full summary for `movie_id` among favorites, then the cached
/// popular listing.
fn find_movie(state: &AppState, movie_id: i64) -> Option<MovieSummary> {
    state
        .favorites
        .favorites()
        .into_iter()
        .find(|m| m.id == movie_id)
        .or_else(|| {
            state
                .popular_movies
                .state()
                .data
                .and_then(|movies| movies.iter().find(|m| m.id == movie_id).cloned())
        })
}

pub async fn toggle_favorite(state: &AppState, movie_id: i64) -> Result<FavoriteToggledDto, String> {
    let movie = find_movie(state, movie_id)
        .ok_or_else(|| ErrorResponse::not_found("Movie").to_json())?;

    let signed_in = state.session.current_user().is_some();
    let is_favorite = state.favorites.toggle_favorite(&movie).to_error_response()?;

    Ok(FavoriteToggledDto {
        movie_id,
        is_favorite,
        changed: signed_in,
    })
}

pub async fn remove_favorite(state: &AppState, movie_id: i64) -> Result<FavoriteToggledDto, String> {
    let was_favorite = state.favorites.is_favorite(movie_id);
    state.favorites.remove_favorite(movie_id).to_error_response()?;

    Ok(FavoriteToggledDto {
        movie_id,
        is_favorite: false,
        changed: was_favorite,
    })
}

pub async fn is_favorite(state: &AppState, movie_id: i64) -> Result<bool, String> {
    Ok(state.favorites.is_favorite(movie_id))
}
