//! User & session invariants:
//!
//! 1. A user is identified by `id` alone
//! 2. `id` is never blank (it is part of the favorites storage key)
//! 3. At most one user is signed in at a time

pub mod entity;
pub mod invariants;

pub use entity::{AuthenticatedUser, Session};
pub use invariants::validate_user;

/// Storage key holding the serialized signed-in user.
pub const SESSION_STORAGE_KEY: &str = "auth:user";
