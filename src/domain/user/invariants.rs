use super::entity::AuthenticatedUser;
use crate::domain::{DomainError, DomainResult};

/// Validates an authenticated user before it is allowed into the session.
///
/// The id drives favorites key derivation, so it must never be blank.
pub fn validate_user(user: &AuthenticatedUser) -> DomainResult<()> {
    if user.id.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "User id cannot be empty".to_string(),
        ));
    }
    Ok(())
}
