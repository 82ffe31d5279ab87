// src/events/types.rs
//
// All domain events in the system.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events are immutable
// - Events carry only the data needed to react

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

macro_rules! impl_domain_event {
    ($ty:ident) => {
        impl DomainEvent for $ty {
            fn event_id(&self) -> Uuid {
                self.event_id
            }
            fn occurred_at(&self) -> DateTime<Utc> {
                self.occurred_at
            }
            fn event_type(&self) -> &'static str {
                stringify!($ty)
            }
        }
    };
}

// ============================================================================
// SESSION EVENTS
// ============================================================================

/// Emitted after a signed-in user has been persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSignedIn {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub user_id: String,
}

impl UserSignedIn {
    pub fn new(user_id: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            user_id,
        }
    }
}

impl_domain_event!(UserSignedIn);

/// Emitted after the session has been cleared
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSignedOut {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub user_id: Option<String>,
}

impl UserSignedOut {
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            user_id,
        }
    }
}

impl_domain_event!(UserSignedOut);

/// Emitted when the identity provider rejects a sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInFailed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub reason: String,
}

impl SignInFailed {
    pub fn new(reason: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            reason,
        }
    }
}

impl_domain_event!(SignInFailed);

// ============================================================================
// STORAGE EVENTS
// ============================================================================

/// Emitted whenever a key is written or removed through the JSON storage layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageValueChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub key: String,
    pub removed: bool,
}

impl StorageValueChanged {
    pub fn new(key: String, removed: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            key,
            removed,
        }
    }
}

impl_domain_event!(StorageValueChanged);

// ============================================================================
// FAVORITES EVENTS
// ============================================================================

/// Emitted after a favorites list has been persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub storage_key: String,
    pub movie_id: i64,
    pub is_favorite: bool,
    pub total: usize,
}

impl FavoritesChanged {
    pub fn new(storage_key: String, movie_id: i64, is_favorite: bool, total: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            storage_key,
            movie_id,
            is_favorite,
            total,
        }
    }
}

impl_domain_event!(FavoritesChanged);

// ============================================================================
// QUERY EVENTS
// ============================================================================

/// Emitted when the popular movies list was fetched successfully
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularMoviesFetched {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub language: String,
    pub page: u32,
    pub movie_count: usize,
}

impl PopularMoviesFetched {
    pub fn new(language: String, page: u32, movie_count: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            language,
            page,
            movie_count,
        }
    }
}

impl_domain_event!(PopularMoviesFetched);

/// Emitted when a query ran out of retries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryFetchFailed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub query_key: String,
    pub failure_count: u32,
    pub message: String,
}

impl QueryFetchFailed {
    pub fn new(query_key: String, failure_count: u32, message: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            query_key,
            failure_count,
            message,
        }
    }
}

impl_domain_event!(QueryFetchFailed);
