// src/integrations/auth/provider.rs
//
// Identity provider seam used by the session manager.

use async_trait::async_trait;

use crate::domain::AuthenticatedUser;
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Runs the provider's sign-in round trip.
    async fn sign_in(&self) -> AppResult<AuthenticatedUser>;

    /// Revokes the provider-side session.
    async fn sign_out(&self) -> AppResult<()>;
}
