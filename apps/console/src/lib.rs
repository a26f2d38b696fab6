//! # Bakery Console Library
//!
//! Application state, commands and the navigation controller of the
//! bakery admin console. The `bakery-console` binary is a thin CLI over
//! this library.
//!
//! ## Module Organization
//! ```text
//! bakery_console/
//! ├── lib.rs          ◄─── You are here (exports, logging setup)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState handle, token effects
//! │   ├── store.rs    ◄─── Store<S>: Arc<Mutex<S>> with closure access
//! │   ├── session.rs  ◄─── Session + auth operation table
//! │   ├── products.rs ◄─── Product list, aggregates, reducers
//! │   └── bills.rs    ◄─── Bills, current bill, today's income
//! ├── dispatch.rs     ◄─── pending → fulfilled | rejected wrapper
//! ├── commands/
//! │   ├── auth.rs     ◄─── login, register, validate_token, logout
//! │   ├── product.rs  ◄─── CRUD, stock, dashboard aggregates
//! │   └── bill.rs     ◄─── generate, history, today's income
//! ├── navigator.rs    ◄─── Route guard + mount-time loads
//! └── error.rs        ◄─── ConsoleError, ApiError for callers
//! ```
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ConsoleConfig ──► HttpClient(SharedToken) ──┐                          │
//! │  FileTokenStore ─────────────────────────────┼──► AppState ──► Navigator│
//! │  StateOptions (guard + stale policy) ────────┘        │                 │
//! │                                                       ▼                 │
//! │                                                   commands::*           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod dispatch;
pub mod error;
pub mod navigator;
pub mod state;

pub use error::{ApiError, ConsoleError, ConsoleResult, ErrorCode};
pub use navigator::{Navigator, Screen};
pub use state::{AppState, StateOptions};

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bakery=trace` - Show trace for bakery crates only
/// - Default: `info,bakery=debug`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bakery=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
