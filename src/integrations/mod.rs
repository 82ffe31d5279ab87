// src/integrations/mod.rs
//
// External Integrations Module
//
// - auth: identity provider seam + mock Google Sign-In
// - tmdb: movie metadata API client

pub mod auth;
pub mod tmdb;

pub use auth::{AuthProvider, MockAuthConfig, MockGoogleSignIn};
pub use tmdb::{MovieSource, PopularMoviesPage, TmdbClient, TmdbMovie};
