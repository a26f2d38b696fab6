//! # bakery-client: Remote Client for the Bakery Console
//!
//! Owns every interaction with the outside world: the REST backend, the
//! persisted session token, and the configuration file.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        bakery-client                                    │
//! │                                                                         │
//! │  ┌──────────────────┐        ┌──────────────────────────────────────┐  │
//! │  │  ConsoleConfig   │──────► │  HttpClient  (impl BakeryApi)        │  │
//! │  │  TOML + env      │        │  reqwest, timeout, X-Request-Id      │  │
//! │  └──────────────────┘        │  Authorization from SharedToken      │  │
//! │                              └──────────────────┬───────────────────┘  │
//! │                                                 │ typed envelopes       │
//! │  ┌──────────────────┐                           ▼                       │
//! │  │  TokenStore      │              Bakery REST API (external)           │
//! │  │  File / Memory   │                                                   │
//! │  └──────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`client`] - `BakeryApi` trait, `HttpClient`, `SharedToken`
//! - [`api`] - Response envelopes and the error body
//! - [`token`] - Persisted token storage
//! - [`config`] - Console configuration
//! - [`error`] - Client error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bakery_client::{BakeryApi, ConsoleConfig, HttpClient, SharedToken};
//!
//! # async fn run() -> bakery_client::ClientResult<()> {
//! let config = ConsoleConfig::load_or_default(None);
//! let client = HttpClient::new(&config, SharedToken::new(None))?;
//! let products = client.list_products().await?;
//! println!("{} products", products.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod token;

pub use client::{BakeryApi, HttpClient, SharedToken};
pub use config::ConsoleConfig;
pub use error::{ClientError, ClientResult};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
