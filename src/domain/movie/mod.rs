pub mod entity;

pub use entity::{MovieSummary, UNKNOWN_MOVIE_ID, UNTITLED};
