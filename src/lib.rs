// src/lib.rs
// MovieHub - Local-first movie browser core
//
// Architecture:
// - Domain-centric: users, movies and favorites lists with their invariants
// - Event-driven: services announce state changes on a synchronous bus
// - Local-first: session and favorites live in a local key-value store
// - Remote data goes through a query cache (staleness, dedup, retry, GC)
// - Application Layer: DTOs + commands for whatever UI hosts the core

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod infrastructure;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    favorites_key, validate_favorites, validate_user, AuthenticatedUser, FavoritesList,
    MovieSummary, Session,
};

// ============================================================================
// PUBLIC API - Error Types & Configuration
// ============================================================================

pub use config::AppConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus, DomainEvent, EventBus, EventLogEntry, FavoritesChanged,
    PopularMoviesFetched, QueryFetchFailed, SignInFailed, StorageValueChanged, UserSignedIn,
    UserSignedOut,
};

// ============================================================================
// PUBLIC API - Storage
// ============================================================================

pub use db::{create_connection_pool, create_memory_pool, initialize_database, ConnectionPool};
pub use infrastructure::JsonStorage;
pub use repositories::{InMemoryKeyValueRepository, KeyValueRepository, SqliteKeyValueRepository};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    AuthOutcome, ErrorKind, FavoritesService, PopularMoviesService, QueryCache, QueryKey,
    QueryOptions, QueryState, QueryStatus, RetryPolicy, SessionManager,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::AppState;

// Re-export application submodules
pub use application::commands;
pub use application::dto;

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::{AuthProvider, MockAuthConfig, MockGoogleSignIn, MovieSource, TmdbClient};
