// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod favorites_service;
pub mod popular_movies_service;
pub mod query;
pub mod session_service;

// Re-export all services and their types
pub use session_service::{AuthOutcome, SessionManager};

pub use popular_movies_service::{MoviesState, PopularMoviesService};

pub use favorites_service::FavoritesService;

pub use query::{
    ErrorClassifier, ErrorKind, MessagePatternClassifier, QueryCache, QueryError, QueryKey,
    QueryObserver, QueryOptions, QueryState, QueryStatus, RetryPolicy, VariantClassifier,
};
