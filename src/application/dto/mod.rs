// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are UI-friendly representations
// - DTOs NEVER leak domain invariants
// - DTOs are simple, serializable structs
// - Conversion FROM domain entities only (never TO)

use serde::{Deserialize, Serialize};

use crate::domain::{AuthenticatedUser, MovieSummary, Session};
use crate::services::{MoviesState, QueryStatus};

// ============================================================================
// SESSION DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub user: Option<UserDto>,
    pub is_signed_in: bool,
    pub is_authenticating: bool,
}

// ============================================================================
// MOVIE DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDto {
    pub id: i64,
    pub title: String,
    pub average_rating: f64,
    pub overview: String,
    pub poster_url: Option<String>,
    pub release_date: Option<String>,
    pub is_favorite: bool,
}

impl MovieDto {
    pub fn from_summary(movie: &MovieSummary, image_base_url: &str, is_favorite: bool) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            average_rating: movie.average_rating,
            overview: movie.overview.clone(),
            poster_url: movie.poster_url(image_base_url),
            release_date: movie.release_date.clone(),
            is_favorite,
        }
    }
}

/// One render of a remote listing: data, error, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviesQueryDto {
    pub status: QueryStatus,
    pub movies: Vec<MovieDto>,
    pub error: Option<String>,
    pub is_fetching: bool,
    /// A retry action should be offered
    pub can_retry: bool,
    pub updated_at: Option<String>,
}

impl MoviesQueryDto {
    /// `flags` pairs every cached movie with its favorite badge.
    pub fn from_state(
        state: &MoviesState,
        flags: Vec<(MovieSummary, bool)>,
        image_base_url: &str,
    ) -> Self {
        Self {
            status: state.status,
            movies: flags
                .iter()
                .map(|(movie, fav)| MovieDto::from_summary(movie, image_base_url, *fav))
                .collect(),
            error: state.error.as_ref().map(|e| e.message.clone()),
            is_fetching: state.is_fetching,
            can_retry: state.is_error(),
            updated_at: state.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

// ============================================================================
// FAVORITES DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesDto {
    pub storage_key: String,
    pub movies: Vec<MovieDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggledDto {
    pub movie_id: i64,
    pub is_favorite: bool,
    /// False when nothing was written (no one signed in, or nothing to remove)
    pub changed: bool,
}

// ============================================================================
// CONVERSIONS (Domain -> DTO)
// ============================================================================

impl From<AuthenticatedUser> for UserDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
        }
    }
}

impl From<Session> for SessionDto {
    fn from(session: Session) -> Self {
        Self {
            is_signed_in: session.is_signed_in(),
            user: session.current_user.map(UserDto::from),
            is_authenticating: session.is_authenticating,
        }
    }
}
