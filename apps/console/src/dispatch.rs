//! # Lifecycle Wrapper
//!
//! Runs one remote operation through pending → fulfilled | rejected.
//!
//! ## Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      dispatch(store, op, work, ..)                      │
//! │                                                                         │
//! │  1. store.update: ops.begin(op) ─────────────► Pending, error cleared   │
//! │                    (ticket, drop guard armed)                           │
//! │  2. work.await  (exactly once, panics caught)                           │
//! │         │                                                               │
//! │         ├── Ok(payload) ──► store.update:                               │
//! │         │                   accepted? reducer(payload) + fulfill        │
//! │         │                                                               │
//! │         ├── Err(e) ───────► store.update:                               │
//! │         │                   accepted? reject(user_message(op))          │
//! │         │                   payload untouched                           │
//! │         │                                                               │
//! │         └── panic ────────► reject(fallback message), error! logged     │
//! │                                                                         │
//! │  Future dropped between 1 and 3 ──► drop guard: ops.abandon(ticket)     │
//! │                                     "Request was cancelled"             │
//! │                                                                         │
//! │  3. guard disarmed, result returned to the command                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "accepted" is decided by the store's [`StalePolicy`](bakery_core::StalePolicy):
//! with `LastCompletionWins` every completion is applied in arrival order.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use bakery_core::lifecycle::CANCELLED_MESSAGE;
use bakery_core::{Operation, Ticket};
use futures_util::FutureExt;
use tracing::{debug, error, warn};

use crate::error::{ApiError, ConsoleResult, ErrorCode};
use crate::state::{Store, Tracked};

/// How an operation settled, as seen by the settle callback.
#[derive(Debug)]
pub enum Outcome<'a, T> {
    Fulfilled(&'a T),
    Rejected(&'a str),
}

/// Result of [`dispatch_with`].
#[derive(Debug)]
pub struct Settlement<T, R> {
    /// The payload, or the error that was (or would have been) recorded.
    pub result: Result<T, ApiError>,
    /// Value returned by the settle callback, `None` if the completion was
    /// dropped as stale.
    pub applied: Option<R>,
}

// =============================================================================
// Drop Guard
// =============================================================================

struct PendingGuard<'a, S: Tracked> {
    store: &'a Store<S>,
    ticket: Option<Ticket>,
}

impl<'a, S: Tracked> PendingGuard<'a, S> {
    fn disarm(&mut self) {
        self.ticket = None;
    }
}

impl<S: Tracked> Drop for PendingGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            let abandoned = self.store.update(|s| {
                let abandoned = s.ops_mut().abandon(ticket);
                if abandoned {
                    s.on_abandon(ticket.op);
                }
                abandoned
            });
            if abandoned {
                warn!(op = ticket.op.name(), "{}", CANCELLED_MESSAGE);
            }
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs `work` under `op` and reduces a successful payload into the store.
///
/// The payload is returned even when a stale completion was dropped.
pub async fn dispatch<S, T, Fut, R>(
    store: &Store<S>,
    op: Operation,
    work: Fut,
    reduce: R,
) -> Result<T, ApiError>
where
    S: Tracked,
    Fut: Future<Output = ConsoleResult<T>>,
    R: FnOnce(&mut S, &T),
{
    dispatch_with(store, op, work, |state, outcome| {
        if let Outcome::Fulfilled(payload) = outcome {
            reduce(state, payload);
        }
    })
    .await
    .result
}

/// Like [`dispatch`], but `settle` also sees rejections and its return
/// value is handed back.
///
/// `settle` runs under the store lock and only for accepted completions.
pub async fn dispatch_with<S, T, Fut, F, R>(
    store: &Store<S>,
    op: Operation,
    work: Fut,
    settle: F,
) -> Settlement<T, R>
where
    S: Tracked,
    Fut: Future<Output = ConsoleResult<T>>,
    F: FnOnce(&mut S, Outcome<'_, T>) -> R,
{
    let ticket = store.update(|s| s.ops_mut().begin(op));
    debug!(op = op.name(), generation = ticket.generation, "pending");

    let mut guard = PendingGuard {
        store,
        ticket: Some(ticket),
    };

    let result = AssertUnwindSafe(work).catch_unwind().await;

    let settlement = match result {
        Ok(Ok(payload)) => {
            let applied = store.update(|s| {
                if !s.ops_mut().fulfill(ticket) {
                    return None;
                }
                Some(settle(s, Outcome::Fulfilled(&payload)))
            });
            if applied.is_some() {
                debug!(op = op.name(), generation = ticket.generation, "fulfilled");
            } else {
                debug!(op = op.name(), generation = ticket.generation, "stale completion dropped");
            }
            Settlement {
                result: Ok(payload),
                applied,
            }
        }
        Ok(Err(err)) => {
            let message = err.user_message(op);
            warn!(op = op.name(), error = %err, "rejected: {}", message);
            reject(store, ticket, ApiError::from_failure(&err, message), settle)
        }
        Err(_) => {
            error!(op = op.name(), "Operation panicked");
            let err = ApiError::new(ErrorCode::Internal, op.fallback_message());
            reject(store, ticket, err, settle)
        }
    };

    guard.disarm();
    settlement
}

fn reject<S, T, F, R>(store: &Store<S>, ticket: Ticket, err: ApiError, settle: F) -> Settlement<T, R>
where
    S: Tracked,
    F: FnOnce(&mut S, Outcome<'_, T>) -> R,
{
    let applied = store.update(|s| {
        if !s.ops_mut().reject(ticket, err.message.as_str()) {
            return None;
        }
        Some(settle(s, Outcome::Rejected(&err.message)))
    });
    Settlement {
        result: Err(err),
        applied,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
