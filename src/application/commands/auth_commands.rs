// src/application/commands/auth_commands.rs
//
// Session Command Handlers

use crate::application::dto::SessionDto;
use crate::application::error_handling::ToErrorResponse;
use crate::application::state::AppState;
use crate::services::AuthOutcome;

/// Runs the Google sign-in flow. A call made while another sign-in or
/// sign-out is pending is ignored and returns the current session.
pub async fn sign_in_with_google(state: &AppState) -> Result<SessionDto, String> {
    let outcome = state.session.sign_in().await.to_error_response()?;
    if outcome == AuthOutcome::AlreadyInFlight {
        log::debug!("sign_in_with_google: already authenticating");
    }
    Ok(state.session.snapshot().into())
}

pub async fn sign_out(state: &AppState) -> Result<SessionDto, String> {
    state.session.sign_out().await.to_error_response()?;
    Ok(state.session.snapshot().into())
}

pub async fn get_session(state: &AppState) -> Result<SessionDto, String> {
    Ok(state.session.snapshot().into())
}
