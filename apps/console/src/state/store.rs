//! # Store Handle
//!
//! Shared, lock-protected state with closure accessors.
//!
//! ## Locking Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Store<S> Access                                 │
//! │                                                                         │
//! │  command                    Store<S>                                    │
//! │  ───────                    ────────                                    │
//! │  store.update(|s| begin) ──► lock ─► mutate ─► unlock                   │
//! │  api.call().await            (no lock held while suspended)             │
//! │  store.update(|s| reduce) ─► lock ─► mutate ─► unlock                   │
//! │                                                                         │
//! │  Closures are synchronous, so a lock can never be held across an       │
//! │  .await and each mutation is atomic with respect to one event turn.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use bakery_core::{Operation, OperationTable};

/// A store whose operations go through the lifecycle wrapper.
pub trait Tracked {
    fn ops_mut(&mut self) -> &mut OperationTable;

    /// Called when an in-flight `op` is dropped before it settled.
    fn on_abandon(&mut self, _op: Operation) {}
}

/// Cloneable handle to one store.
#[derive(Debug, Default)]
pub struct Store<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Store {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Store<S> {
    pub fn new(state: S) -> Self {
        Store {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// A panic inside an earlier closure leaves the state as it was at
    /// the panic point; the store keeps serving it.
    fn lock(&self) -> MutexGuard<'_, S> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Executes a function with read access to the state.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let count = products.read(|s| s.products.len());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let state = self.lock();
        f(&state)
    }

    /// Executes a function with write access to the state.
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut S) -> R,
    {
        let mut state = self.lock();
        f(&mut state)
    }
}

impl<S: Clone> Store<S> {
    /// Copy of the whole state, for rendering.
    pub fn snapshot(&self) -> S {
        self.read(S::clone)
    }
}
