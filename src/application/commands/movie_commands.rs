// src/application/commands/movie_commands.rs
//
// Movie Listing Command Handlers
//
// RULES:
// - Fetch failures are part of the returned DTO, not an Err
// - Every movie carries its favorite badge

use crate::application::dto::MoviesQueryDto;
use crate::application::state::AppState;
use crate::services::MoviesState;

fn to_dto(state: &AppState, query: &MoviesState) -> MoviesQueryDto {
    let movies = query.data.as_deref().map(Vec::as_slice).unwrap_or_default();
    let flags = state.favorites.annotate(movies);
    MoviesQueryDto::from_state(query, flags, &state.config.image_base_url)
}

/// Popular movies, served from cache while fresh.
pub async fn list_popular_movies(state: &AppState) -> Result<MoviesQueryDto, String> {
    let query = state.popular_movies.popular_movies().await;
    Ok(to_dto(state, &query))
}

/// The "retry" action: fetches regardless of freshness.
pub async fn refresh_popular_movies(state: &AppState) -> Result<MoviesQueryDto, String> {
    let query = state.popular_movies.refresh().await;
    Ok(to_dto(state, &query))
}

/// Called by the host when connectivity returns.
pub async fn notify_reconnect(state: &AppState) -> Result<Option<MoviesQueryDto>, String> {
    let query = state.popular_movies.on_reconnect().await;
    Ok(query.map(|q| to_dto(state, &q)))
}

/// Called by the host when the window regains focus.
pub async fn notify_window_focus(state: &AppState) -> Result<Option<MoviesQueryDto>, String> {
    let query = state.popular_movies.on_window_focus().await;
    Ok(query.map(|q| to_dto(state, &q)))
}
