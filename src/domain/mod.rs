// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod favorites;
pub mod movie;
pub mod user;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// User / Session
pub use user::{validate_user, AuthenticatedUser, Session, SESSION_STORAGE_KEY};

// Movie
pub use movie::{MovieSummary, UNKNOWN_MOVIE_ID, UNTITLED};

// Favorites
pub use favorites::{
    favorites_key, validate_favorites, FavoritesList, ANONYMOUS_FAVORITES_KEY,
    FAVORITES_KEY_PREFIX,
};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
