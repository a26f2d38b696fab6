//! # Wire Envelopes
//!
//! Response wrappers the backend puts around the domain types.
//!
//! ```text
//! GET  /products              { "data": { "products": [..] } }  or  { "data": [..] }
//! POST /products              { "data": { "product": {..} } }
//! GET  /bills                 { "data": { "bills": [..] } }
//! GET  /bills/:id             { "data": { "bill": {..} } }
//! POST /bills/generate        { "data": { "bill": {..} } }
//! GET  /bills/today/income    { "data": { "income": 1250.5 } }
//! POST /auth/login            { "token": "..", "user": {..} }
//! GET  /auth/verify           { "user": {..} }
//! any error                   { "message": ".." }
//! ```
//!
//! Each endpoint parses into exactly one of these; a body that matches none
//! is a `ClientError::Parse`.

use bakery_core::{Bill, Money, Product, User};
use serde::{Deserialize, Serialize};

/// `{ "data": T }`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// The product list, in either shape the server emits.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductList {
    Wrapped { products: Vec<Product> },
    Bare(Vec<Product>),
}

impl ProductList {
    pub fn into_vec(self) -> Vec<Product> {
        match self {
            ProductList::Wrapped { products } => products,
            ProductList::Bare(products) => products,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductBody {
    pub product: Product,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillList {
    #[serde(default)]
    pub bills: Vec<Bill>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillBody {
    pub bill: Bill,
}

/// Today's income; also the body of the manual correction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IncomeBody {
    pub income: Money,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyBody {
    pub user: User,
}

/// Error body. Anything else the server sends is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Extracts `message` from raw bytes; non-JSON bodies yield `None`.
    pub fn message_from(bytes: &[u8]) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(bytes)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
    }
}
