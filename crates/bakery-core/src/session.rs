//! # Session State Machine
//!
//! Authentication state derived from login, registration and token
//! verification. Pure: transitions return a [`TokenEffect`] and the
//! application decides how to persist it.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Session Phases                                 │
//! │                                                                         │
//! │              login_succeeded (Persist)                                  │
//! │   Anonymous ─────────────────────────────────► Authenticated            │
//! │     │    ▲                                        │    ▲                │
//! │     │    └────────── logout (Erase) ◄─────────────┘    │                │
//! │     │                                                  │                │
//! │     │ begin_validation            validation_succeeded │                │
//! │     └──────────────────► Validating ───────────────────┘                │
//! │                              │                                          │
//! │   Invalid ◄── validation_failed / force_invalid (Erase) ── any phase   │
//! │     │                                                                   │
//! │     └── begin_validation / login_succeeded ──► (as above)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failed Attempts
//! A failed login or registration only records `last_error`. It never
//! changes the phase, so a failure while already signed in keeps the
//! existing session intact.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{AuthSuccess, User};

// =============================================================================
// Phase & Effects
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Anonymous,
    Validating,
    Authenticated,
    Invalid,
}

/// What a transition requires of the persisted token.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenEffect {
    None,
    Persist(String),
    Erase,
}

impl fmt::Debug for TokenEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenEffect::None => write!(f, "None"),
            TokenEffect::Persist(_) => write!(f, "Persist(<redacted>)"),
            TokenEffect::Erase => write!(f, "Erase"),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// In-memory session.
///
/// `is_authenticated()` holds only when the phase is `Authenticated`, the
/// token is non-empty and a user is present.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub phase: SessionPhase,
    #[serde(skip_serializing)]
    token: Option<String>,
    pub user: Option<User>,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("has_token", &self.has_token())
            .field("user", &self.user.as_ref().map(|u| &u.email))
            .field("loading", &self.loading)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl Session {
    /// Session at process start. A persisted token is copied into memory
    /// but validation has not started yet.
    pub fn boot(persisted: Option<String>) -> Self {
        Session {
            token: persisted.filter(|t| !t.trim().is_empty()),
            ..Session::default()
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated && self.has_token() && self.user.is_some()
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    pub fn begin_login(&mut self) -> TokenEffect {
        self.loading = true;
        self.last_error = None;
        TokenEffect::None
    }

    pub fn login_succeeded(&mut self, auth: AuthSuccess) -> TokenEffect {
        self.phase = SessionPhase::Authenticated;
        self.token = Some(auth.token.clone());
        self.user = Some(auth.user);
        self.loading = false;
        self.last_error = None;
        TokenEffect::Persist(auth.token)
    }

    pub fn login_failed(&mut self, message: impl Into<String>) -> TokenEffect {
        self.loading = false;
        self.last_error = Some(message.into());
        TokenEffect::None
    }

    // -------------------------------------------------------------------------
    // Registration (does not sign the user in)
    // -------------------------------------------------------------------------

    pub fn begin_register(&mut self) -> TokenEffect {
        self.begin_login()
    }

    pub fn register_succeeded(&mut self) -> TokenEffect {
        self.loading = false;
        self.last_error = None;
        TokenEffect::None
    }

    pub fn register_failed(&mut self, message: impl Into<String>) -> TokenEffect {
        self.login_failed(message)
    }

    // -------------------------------------------------------------------------
    // Token Validation
    // -------------------------------------------------------------------------

    pub fn begin_validation(&mut self) -> TokenEffect {
        self.phase = SessionPhase::Validating;
        self.loading = true;
        self.last_error = None;
        TokenEffect::None
    }

    /// Completes validation. Ignored unless validation is in flight, so a
    /// late answer cannot resurrect a session that was logged out meanwhile.
    pub fn validation_succeeded(&mut self, user: User) -> TokenEffect {
        if self.phase != SessionPhase::Validating {
            return TokenEffect::None;
        }
        if !self.has_token() {
            return self.validation_failed();
        }
        self.phase = SessionPhase::Authenticated;
        self.user = Some(user);
        self.loading = false;
        TokenEffect::None
    }

    /// Fail-closed: always discards the user and the token, whatever the
    /// phase and whatever caused the failure.
    pub fn validation_failed(&mut self) -> TokenEffect {
        self.phase = SessionPhase::Invalid;
        self.token = None;
        self.user = None;
        self.loading = false;
        TokenEffect::Erase
    }

    /// The backend rejected the token outside of validation (401 on a fetch).
    pub fn force_invalid(&mut self) -> TokenEffect {
        self.validation_failed()
    }

    pub fn logout(&mut self) -> TokenEffect {
        *self = Session::default();
        TokenEffect::Erase
    }

    /// An attempt was dropped before the backend answered. Cancellation is
    /// not a verdict on the token, so it is kept and the phase steps back.
    pub fn abandon_pending(&mut self) -> TokenEffect {
        self.loading = false;
        if self.phase == SessionPhase::Validating {
            self.phase = SessionPhase::Anonymous;
        }
        TokenEffect::None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
