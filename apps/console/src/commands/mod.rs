//! # Commands Module
//!
//! Every user action the console supports, as an async function over
//! [`AppState`](crate::state::AppState).
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── auth.rs     ◄─── Login, signup, token validation, logout
//! ├── product.rs  ◄─── Product CRUD, stock, dashboard aggregates
//! └── bill.rs     ◄─── Bill generation, history, today's income
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Command Flow                                      │
//! │                                                                         │
//! │  CLI / Navigator                                                        │
//! │  ───────────────                                                        │
//! │  commands::product::create_product(&state, draft).await                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  dispatch(state.products(), Operation::CreateProduct, work, reducer)    │
//! │         │                                                               │
//! │         │   work = validate(draft)? then api.create_product(&draft)     │
//! │         ▼                                                               │
//! │  Result<Product, ApiError>                                              │
//! │    Ok  ─► reducer already ran, store holds the new product             │
//! │    Err ─► store's op error holds the same message as ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Work Functions
//! Each command's unit of work is a private `async fn` returning
//! `ConsoleResult<T>`: local validation first, then exactly one remote
//! call. A validation failure therefore rejects the operation without
//! touching the network.

pub mod auth;
pub mod bill;
pub mod product;
