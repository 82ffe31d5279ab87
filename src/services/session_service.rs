// src/services/session_service.rs
//
// Session Manager
//
// RULES:
// - Hydrated synchronously from storage at construction
// - Writes go to storage first, then to memory
// - At most one sign-in/sign-out in flight; extra calls are dropped

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::{validate_user, AuthenticatedUser, Session, SESSION_STORAGE_KEY};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, SignInFailed, UserSignedIn, UserSignedOut};
use crate::infrastructure::JsonStorage;
use crate::integrations::auth::AuthProvider;

/// What a sign-in/sign-out call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Completed,
    /// Another operation was already in flight; nothing happened.
    AlreadyInFlight,
}

/// Clears the in-flight flag however the operation ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SessionManager {
    storage: Arc<JsonStorage>,
    auth_provider: Arc<dyn AuthProvider>,
    event_bus: Arc<EventBus>,
    current_user: RwLock<Option<AuthenticatedUser>>,
    is_authenticating: AtomicBool,
}

impl SessionManager {
    pub fn new(
        storage: Arc<JsonStorage>,
        auth_provider: Arc<dyn AuthProvider>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let persisted: Option<AuthenticatedUser> = storage.get_json(SESSION_STORAGE_KEY, None);
        let current_user = persisted.filter(|user| match validate_user(user) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Ignoring persisted session: {}", e);
                false
            }
        });

        match &current_user {
            Some(user) => log::info!("Restored session for {}", user.id),
            None => log::debug!("Starting unauthenticated"),
        }

        Self {
            storage,
            auth_provider,
            event_bus,
            current_user: RwLock::new(current_user),
            is_authenticating: AtomicBool::new(false),
        }
    }

    pub fn current_user(&self) -> Option<AuthenticatedUser> {
        self.current_user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticating(&self) -> bool {
        self.is_authenticating.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Session {
        Session {
            current_user: self.current_user(),
            is_authenticating: self.is_authenticating(),
        }
    }

    fn begin(&self) -> Option<InFlightGuard<'_>> {
        self.is_authenticating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlightGuard(&self.is_authenticating))
    }

    /// Signs in through the provider. A provider failure is returned as
    /// `AppError::Authentication` and leaves the session untouched.
    pub async fn sign_in(&self) -> AppResult<AuthOutcome> {
        let Some(_guard) = self.begin() else {
            log::debug!("Sign-in ignored: authentication already in flight");
            return Ok(AuthOutcome::AlreadyInFlight);
        };

        let user = match self.auth_provider.sign_in().await {
            Ok(user) => user,
            Err(AppError::Authentication(reason)) => return Err(self.sign_in_failed(reason)),
            Err(other) => return Err(self.sign_in_failed(other.to_string())),
        };

        if let Err(e) = validate_user(&user) {
            return Err(self.sign_in_failed(e.to_string()));
        }
        self.persist_user(Some(user.clone()))?;

        log::info!("Signed in as {}", user.id);
        self.event_bus.emit(UserSignedIn::new(user.id));
        Ok(AuthOutcome::Completed)
    }

    /// Signs out through the provider and clears the persisted session.
    pub async fn sign_out(&self) -> AppResult<AuthOutcome> {
        let Some(_guard) = self.begin() else {
            log::debug!("Sign-out ignored: authentication already in flight");
            return Ok(AuthOutcome::AlreadyInFlight);
        };

        self.auth_provider.sign_out().await?;

        let previous = self.current_user().map(|u| u.id);
        self.persist_user(None)?;

        log::info!("Signed out");
        self.event_bus.emit(UserSignedOut::new(previous));
        Ok(AuthOutcome::Completed)
    }

    fn sign_in_failed(&self, reason: String) -> AppError {
        log::warn!("Sign-in failed: {}", reason);
        self.event_bus.emit(SignInFailed::new(reason.clone()));
        AppError::Authentication(reason)
    }

    fn persist_user(&self, user: Option<AuthenticatedUser>) -> AppResult<()> {
        match &user {
            Some(user) => self.storage.set_json(SESSION_STORAGE_KEY, user)?,
            None => self.storage.remove_value(SESSION_STORAGE_KEY)?,
        }
        *self
            .current_user
            .write()
            .unwrap_or_else(PoisonError::into_inner) = user;
        Ok(())
    }
}
