//! # Auth Commands
//!
//! Login, signup, token validation and logout.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Commands                                     │
//! │                                                                         │
//! │  login() ───► begin_login ──► api.login ──┬─► login_succeeded           │
//! │                                           │     └─► Persist(token)      │
//! │                                           └─► login_failed (phase kept) │
//! │                                                                         │
//! │  validate_token() ──► begin_validation ──► api.verify_token             │
//! │                                   ├─► validation_succeeded              │
//! │                                   └─► validation_failed ─► Erase        │
//! │                                       (ANY failure, network included)   │
//! │                                                                         │
//! │  logout() ──► Session reset ──► Erase (no request in flight needed)    │
//! │                                                                         │
//! │  Every TokenEffect is applied to the token file and the bearer slot    │
//! │  right after the transition that produced it.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bakery_client::BakeryApi;
use bakery_core::validation::{validate_email, validate_new_password, validate_password};
use bakery_core::{
    AuthSuccess, Credentials, Operation, Registration, Session, TokenEffect, User, ValidationError,
};
use tracing::{debug, info, warn};

use crate::dispatch::{dispatch_with, Outcome, Settlement};
use crate::error::{ApiError, ConsoleError, ConsoleResult};
use crate::state::AppState;

// =============================================================================
// Work
// =============================================================================

async fn login_work<A: BakeryApi>(api: &A, credentials: &Credentials) -> ConsoleResult<AuthSuccess> {
    validate_email(&credentials.email)?;
    validate_password(&credentials.password)?;
    Ok(api.login(credentials).await?)
}

async fn register_work<A: BakeryApi>(api: &A, registration: &Registration) -> ConsoleResult<()> {
    if registration.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        }
        .into());
    }
    validate_email(&registration.email)?;
    validate_new_password(&registration.password)?;
    Ok(api.register(registration).await?)
}

async fn verify_work<A: BakeryApi>(api: &A, token: Option<String>) -> ConsoleResult<User> {
    let token = token.ok_or(ConsoleError::NoToken)?;
    Ok(api.verify_token(&token).await?)
}

/// Applies the effect of an accepted session transition, then reports the
/// operation's own result first.
fn finish<A, T>(state: &AppState<A>, settlement: Settlement<T, TokenEffect>) -> Result<T, ApiError> {
    let stored = match &settlement.applied {
        Some(effect) => state.apply_token_effect(effect).map_err(ApiError::from),
        None => Ok(()),
    };
    let value = settlement.result?;
    stored?;
    Ok(value)
}

// =============================================================================
// Commands
// =============================================================================

/// Signs in. On failure the phase is left as it was, so an existing
/// session survives a mistyped password.
pub async fn login<A: BakeryApi>(
    state: &AppState<A>,
    credentials: Credentials,
) -> Result<Session, ApiError> {
    debug!(email = %credentials.email, "login");
    state.session().update(|s| s.session.begin_login());

    let work = login_work(state.api(), &credentials);
    let settlement = dispatch_with(state.session(), Operation::Login, work, |s, outcome| {
        match outcome {
            Outcome::Fulfilled(auth) => s.session.login_succeeded(auth.clone()),
            Outcome::Rejected(message) => s.session.login_failed(message),
        }
    })
    .await;
    finish(state, settlement)?;

    let session = state.current_session();
    if let Some(user) = &session.user {
        info!(user_id = %user.id, "Signed in");
    }
    Ok(session)
}

/// Creates an account. Does not sign in.
pub async fn register<A: BakeryApi>(
    state: &AppState<A>,
    registration: Registration,
) -> Result<(), ApiError> {
    debug!(email = %registration.email, "register");
    state.session().update(|s| s.session.begin_register());

    let work = register_work(state.api(), &registration);
    let settlement = dispatch_with(state.session(), Operation::Register, work, |s, outcome| {
        match outcome {
            Outcome::Fulfilled(()) => s.session.register_succeeded(),
            Outcome::Rejected(message) => s.session.register_failed(message),
        }
    })
    .await;
    finish(state, settlement)?;

    info!(email = %registration.email, "Account registered");
    Ok(())
}

/// Verifies the persisted token with the backend.
///
/// Fail-closed: any rejection (401, timeout, malformed body) invalidates
/// the session and erases the token.
pub async fn validate_token<A: BakeryApi>(state: &AppState<A>) -> Result<Session, ApiError> {
    let in_memory = state
        .session()
        .read(|s| s.session.token().map(str::to_string));
    let token = match in_memory {
        Some(token) => Some(token),
        None => state.token_store().load().unwrap_or_else(|e| {
            warn!("Could not read persisted token: {}", e);
            None
        }),
    };
    debug!(has_token = token.is_some(), "validate_token");

    state.session().update(|s| {
        if !s.session.has_token() && token.is_some() {
            s.session = Session::boot(token.clone());
        }
        s.session.begin_validation()
    });

    let work = verify_work(state.api(), token);
    let settlement = dispatch_with(
        state.session(),
        Operation::ValidateToken,
        work,
        |s, outcome| match outcome {
            Outcome::Fulfilled(user) => s.session.validation_succeeded(user.clone()),
            Outcome::Rejected(_) => s.session.validation_failed(),
        },
    )
    .await;
    let result = finish(state, settlement);

    let session = state.current_session();
    match &result {
        Ok(_) if session.is_authenticated() => info!("Session token validated"),
        Ok(_) => debug!(phase = ?session.phase, "Validation result not applied"),
        Err(err) => warn!(error = %err, "Session token rejected"),
    }
    result.map(|_| session)
}

/// Signs out. Clears the session and the persisted token.
pub fn logout<A>(state: &AppState<A>) -> Result<(), ApiError> {
    let effect = state.session().update(|s| s.session.logout());
    info!("Signed out");
    state.apply_token_effect(&effect)?;
    Ok(())
}
