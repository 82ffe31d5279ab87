// src/integrations/auth/google_sign_in.rs
//
// Temporary Google Sign-In stand-in: waits like a network round trip,
// then always succeeds with a fixed user.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::provider::AuthProvider;
use crate::domain::AuthenticatedUser;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockAuthConfig {
    pub sign_in_delay_ms: u64,
    pub sign_out_delay_ms: u64,
}

impl Default for MockAuthConfig {
    fn default() -> Self {
        Self {
            sign_in_delay_ms: 600,
            sign_out_delay_ms: 300,
        }
    }
}

pub struct MockGoogleSignIn {
    config: MockAuthConfig,
    user: AuthenticatedUser,
}

impl MockGoogleSignIn {
    pub fn new(config: MockAuthConfig) -> Self {
        Self {
            config,
            user: Self::default_user(),
        }
    }

    /// Signs in as `user` instead of the built-in account.
    pub fn with_user(mut self, user: AuthenticatedUser) -> Self {
        self.user = user;
        self
    }

    pub fn default_user() -> AuthenticatedUser {
        AuthenticatedUser::new(
            "mock-google-user".to_string(),
            "candidate@example.com".to_string(),
            "Movie Buff".to_string(),
        )
        .with_avatar("https://i.pravatar.cc/150?img=12".to_string())
    }
}

impl Default for MockGoogleSignIn {
    fn default() -> Self {
        Self::new(MockAuthConfig::default())
    }
}

#[async_trait]
impl AuthProvider for MockGoogleSignIn {
    async fn sign_in(&self) -> AppResult<AuthenticatedUser> {
        tokio::time::sleep(Duration::from_millis(self.config.sign_in_delay_ms)).await;
        log::debug!("Mock Google sign-in resolved for {}", self.user.id);
        Ok(self.user.clone())
    }

    async fn sign_out(&self) -> AppResult<()> {
        tokio::time::sleep(Duration::from_millis(self.config.sign_out_delay_ms)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_waits_then_returns_fixed_user() {
        let provider = MockGoogleSignIn::default();
        let started = Instant::now();

        let user = provider.sign_in().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(600));
        assert_eq!(user.id, "mock-google-user");
        assert_eq!(user.email, "candidate@example.com");
        assert_eq!(user.full_name, "Movie Buff");
        assert_eq!(user.avatar_url.as_deref(), Some("https://i.pravatar.cc/150?img=12"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_waits() {
        let provider = MockGoogleSignIn::default();
        let started = Instant::now();
        provider.sign_out().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_custom_user() {
        let custom = AuthenticatedUser::new("u2".into(), "u2@x.io".into(), "Two".into());
        let provider = MockGoogleSignIn::new(MockAuthConfig {
            sign_in_delay_ms: 0,
            sign_out_delay_ms: 0,
        })
        .with_user(custom.clone());
        assert_eq!(provider.sign_in().await.unwrap(), custom);
    }
}
