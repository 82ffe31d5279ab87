pub mod client;
pub mod mapping;

pub use client::{MovieSource, PopularMoviesPage, TmdbClient, TmdbMovie};
pub use mapping::{map_popular_page, map_to_movie_summary};

#[cfg(test)]
pub use client::MockMovieSource;
