//! # Route Guard
//!
//! Decides whether a protected view renders, waits, or redirects.
//!
//! ## Decision Table
//! ```text
//! ┌───────────────────┬─────────┬─────────────────┬──────────────────────────┐
//! │ authenticated     │ loading │ token persisted │ decision                 │
//! ├───────────────────┼─────────┼─────────────────┼──────────────────────────┤
//! │ true              │ any     │ any             │ Render                   │
//! │ false             │ true    │ any             │ Loading                  │
//! │ false             │ false   │ true            │ FailClosed → Loading     │
//! │                   │         │                 │ Optimistic → Render      │
//! │ false             │ false   │ false           │ RedirectToLogin          │
//! └───────────────────┴─────────┴─────────────────┴──────────────────────────┘
//! ```
//!
//! The persisted-token flag is read from storage independently of the
//! session; the two disagree briefly at boot before validation starts.

use serde::{Deserialize, Serialize};

use crate::session::{Session, SessionPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardInput {
    pub is_authenticated: bool,
    pub loading: bool,
    pub token_persisted: bool,
}

impl GuardInput {
    pub fn new(session: &Session, token_persisted: bool) -> Self {
        GuardInput {
            is_authenticated: session.is_authenticated(),
            loading: session.loading,
            token_persisted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDecision {
    Render,
    Loading,
    RedirectToLogin,
}

/// What to do with a persisted but not yet validated token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardPolicy {
    /// Wait for validation before rendering.
    #[default]
    FailClosed,
    /// Render as soon as a token exists.
    Optimistic,
}

impl std::str::FromStr for GuardPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fail_closed" | "strict" => Ok(GuardPolicy::FailClosed),
            "optimistic" => Ok(GuardPolicy::Optimistic),
            other => Err(format!(
                "Unknown guard policy: '{}'. Valid options: fail_closed, optimistic",
                other
            )),
        }
    }
}

pub fn decide(policy: GuardPolicy, input: GuardInput) -> GuardDecision {
    if input.is_authenticated {
        return GuardDecision::Render;
    }
    if input.loading {
        return GuardDecision::Loading;
    }
    if input.token_persisted {
        return match policy {
            GuardPolicy::FailClosed => GuardDecision::Loading,
            GuardPolicy::Optimistic => GuardDecision::Render,
        };
    }
    GuardDecision::RedirectToLogin
}

// =============================================================================
// Mount Memory
// =============================================================================

/// Side effect requested by the guard on first mount.
#[derive(Clone, PartialEq, Eq)]
pub enum MountEffect {
    ValidateToken(String),
}

impl std::fmt::Debug for MountEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MountEffect::ValidateToken(_) => write!(f, "ValidateToken(<redacted>)"),
        }
    }
}

/// Per-mount guard memory: validation is requested at most once.
#[derive(Debug, Default)]
pub struct RouteGuard {
    mounted: bool,
}

impl RouteGuard {
    pub fn new() -> Self {
        RouteGuard::default()
    }

    pub fn has_mounted(&self) -> bool {
        self.mounted
    }

    /// Called on every render; only the first call can return an effect.
    pub fn on_mount(&mut self, session: &Session, persisted: Option<&str>) -> Option<MountEffect> {
        if std::mem::replace(&mut self.mounted, true) {
            return None;
        }
        let token = persisted.filter(|t| !t.trim().is_empty())?;
        if session.is_authenticated() || session.phase == SessionPhase::Validating {
            return None;
        }
        Some(MountEffect::ValidateToken(token.to_string()))
    }
}
