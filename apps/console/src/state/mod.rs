//! # State Module
//!
//! The explicit application-state object every command and the navigator
//! receive by reference.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 AppState<A: BakeryApi>  (Arc inside)            │   │
//! │  │  api: A            token: SharedToken    token_store: dyn Store │   │
//! │  │  guard_policy      stale policy (per OperationTable)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌───────────────────┼──────────────────┐                      │
//! │          ▼                   ▼                  ▼                       │
//! │  ┌───────────────┐  ┌────────────────┐  ┌────────────────┐             │
//! │  │ SessionState  │  │ ProductStore   │  │  BillStore     │             │
//! │  │               │  │                │  │                │             │
//! │  │ Session       │  │ products       │  │ bills          │             │
//! │  │ auth ops      │  │ aggregates     │  │ current_bill   │             │
//! │  │               │  │ product ops    │  │ today_income   │             │
//! │  └───────────────┘  └────────────────┘  └────────────────┘             │
//! │                                                                         │
//! │  PERSISTED TOKEN:                                                      │
//! │  • Session transitions return a TokenEffect                            │
//! │  • apply_token_effect() writes it to the token store AND the shared    │
//! │    slot the HTTP client reads its bearer from                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod bills;
mod products;
mod session;
mod store;

pub use bills::BillStore;
pub use products::ProductStore;
pub use session::SessionState;
pub use store::{Store, Tracked};

use std::sync::Arc;

use bakery_client::{BakeryApi, ClientResult, ConsoleConfig, SharedToken, TokenStore};
use bakery_core::{GuardPolicy, Session, StalePolicy, TokenEffect};
use tracing::{info, warn};

/// Policies that shape guard and store behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateOptions {
    pub guard_policy: GuardPolicy,
    pub stale_policy: StalePolicy,
}

impl StateOptions {
    pub fn from_config(config: &ConsoleConfig) -> Self {
        StateOptions {
            guard_policy: config.guard_policy(),
            stale_policy: config.stale_policy(),
        }
    }
}

struct Inner<A> {
    api: A,
    token: SharedToken,
    token_store: Arc<dyn TokenStore>,
    session: Store<SessionState>,
    products: Store<ProductStore>,
    bills: Store<BillStore>,
    options: StateOptions,
}

/// Cloneable handle to the whole console state.
pub struct AppState<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: BakeryApi> AppState<A> {
    /// Boots the state from the persisted token.
    ///
    /// The token (if any) is copied into the session and into the shared
    /// slot; it is not trusted until validation succeeds. An unreadable
    /// token file boots an anonymous session.
    pub fn new(
        api: A,
        token: SharedToken,
        token_store: Arc<dyn TokenStore>,
        options: StateOptions,
    ) -> Self {
        let persisted = token_store.load().unwrap_or_else(|e| {
            warn!("Could not read persisted token: {}", e);
            None
        });
        info!(has_token = persisted.is_some(), "Booting console state");

        token.set(persisted.clone());
        AppState {
            inner: Arc::new(Inner {
                api,
                token,
                token_store,
                session: Store::new(SessionState::boot(persisted, options.stale_policy)),
                products: Store::new(ProductStore::new(options.stale_policy)),
                bills: Store::new(BillStore::new(options.stale_policy)),
                options,
            }),
        }
    }
}

impl<A> AppState<A> {
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    pub fn session(&self) -> &Store<SessionState> {
        &self.inner.session
    }

    pub fn products(&self) -> &Store<ProductStore> {
        &self.inner.products
    }

    pub fn bills(&self) -> &Store<BillStore> {
        &self.inner.bills
    }

    pub fn token_store(&self) -> &dyn TokenStore {
        self.inner.token_store.as_ref()
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        self.inner.options.guard_policy
    }

    pub fn options(&self) -> StateOptions {
        self.inner.options
    }

    /// Copy of the current session.
    pub fn current_session(&self) -> Session {
        self.inner.session.read(|s| s.session.clone())
    }

    /// Applies a session transition's effect to the persisted token and the
    /// bearer slot.
    ///
    /// The slot is updated even when the token file cannot be written, so
    /// an erased token is never sent again by this process.
    pub fn apply_token_effect(&self, effect: &TokenEffect) -> ClientResult<()> {
        match effect {
            TokenEffect::None => Ok(()),
            TokenEffect::Persist(token) => {
                self.inner.token.set(Some(token.clone()));
                self.inner.token_store.save(token)?;
                info!("Session token persisted");
                Ok(())
            }
            TokenEffect::Erase => {
                self.inner.token.set(None);
                self.inner.token_store.clear()?;
                info!("Session token erased");
                Ok(())
            }
        }
    }
}
