//! # bakery-core: Pure Console Logic for the Bakery Admin Console
//!
//! Everything in this crate is deterministic state-transition logic with
//! zero I/O: the session machine, the route guard, the request lifecycle,
//! and the typed schemas the backend speaks.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Bakery Console Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 bakery-console (CLI + app state)                │   │
//! │  │    Navigator ──► commands ──► dispatch ──► Stores               │   │
//! │  └─────────────┬───────────────────────────────────┬───────────────┘   │
//! │                │                                   │                    │
//! │  ┌─────────────▼───────────────────────┐  ┌────────▼────────────────┐  │
//! │  │     ★ bakery-core (THIS CRATE) ★    │  │     bakery-client       │  │
//! │  │                                     │  │  HttpClient (reqwest)   │  │
//! │  │  session   guard   route            │  │  TokenStore, Config     │  │
//! │  │  lifecycle types   money validation │  └────────┬────────────────┘  │
//! │  │                                     │           │ HTTPS             │
//! │  │  NO I/O • NO NETWORK • NO STORAGE   │  ┌────────▼────────────────┐  │
//! │  └─────────────────────────────────────┘  │     Bakery REST API     │  │
//! │                                           └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire schemas (Product, Bill, User, dashboard aggregates)
//! - [`money`] - Integer money in paise
//! - [`validation`] - Form checks run before a request is sent
//! - [`lifecycle`] - Pending / fulfilled / rejected bookkeeping per operation
//! - [`session`] - Authentication phases and persisted-token effects
//! - [`route`] - Views and their mount-time load commands
//! - [`guard`] - Render / wait / redirect decision for protected views
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bakery_core::guard::{decide, GuardDecision, GuardInput, GuardPolicy};
//! use bakery_core::session::Session;
//!
//! let session = Session::boot(None);
//! let input = GuardInput::new(&session, false);
//! assert_eq!(decide(GuardPolicy::FailClosed, input), GuardDecision::RedirectToLogin);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod money;
pub mod route;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use guard::{GuardDecision, GuardPolicy, RouteGuard};
pub use lifecycle::{OpStatus, Operation, OperationTable, StalePolicy, Ticket};
pub use money::Money;
pub use route::{LoadCommand, Route};
pub use session::{Session, SessionPhase, TokenEffect};
pub use types::*;
