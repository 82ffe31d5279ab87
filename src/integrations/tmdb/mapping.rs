// src/integrations/tmdb/mapping.rs
//
// Raw TMDb payloads -> MovieSummary. Callers never see the raw shape.

use super::client::{PopularMoviesPage, TmdbMovie};
use crate::domain::{MovieSummary, UNKNOWN_MOVIE_ID, UNTITLED};

/// Maps one raw movie to the lean summary shape.
pub fn map_to_movie_summary(movie: TmdbMovie) -> MovieSummary {
    let id = movie.numeric_id().unwrap_or(UNKNOWN_MOVIE_ID);

    MovieSummary {
        id,
        title: movie
            .title
            .or(movie.original_title)
            .unwrap_or_else(|| UNTITLED.to_string()),
        average_rating: movie.vote_average.unwrap_or(0.0),
        overview: movie.overview.unwrap_or_default(),
        poster_path: movie.poster_path.filter(|p| !p.is_empty()),
        release_date: movie.release_date.filter(|d| !d.is_empty()),
    }
}

/// Keeps entries with a numeric id and maps them, preserving order.
pub fn map_popular_page(page: PopularMoviesPage) -> Vec<MovieSummary> {
    page.results
        .unwrap_or_default()
        .into_iter()
        .filter(|movie| movie.numeric_id().is_some())
        .map(map_to_movie_summary)
        .collect()
}
