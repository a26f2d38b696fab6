//! # Request Lifecycle
//!
//! Bookkeeping for the pending → fulfilled | rejected cycle every remote
//! operation goes through. This is the pure half: the async driver that
//! actually awaits the request lives in the console crate.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One OperationState per Operation                     │
//! │                                                                         │
//! │            begin()                fulfill(ticket)                       │
//! │   Idle ─────────────► Pending ─────────────────────► Fulfilled          │
//! │    ▲                    │   │                          │                │
//! │    │                    │   └──── reject(ticket) ──► Rejected           │
//! │    │                    │                              │                │
//! │    │                    └──◄──── begin() ◄─────────────┘ (any state)    │
//! │    └──── clear_error() ◄─── Rejected                                    │
//! │                                                                         │
//! │  Every begin() hands out a Ticket with a fresh generation number.      │
//! │  Rejected ALWAYS carries a message (blank → operation fallback).       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Overlapping Requests
//! Two `begin()` calls before either settles are not deduplicated. Which
//! completion is kept depends on [`StalePolicy`]:
//!
//! - `LastCompletionWins` (default): whichever response arrives last
//!   overwrites state, even if it was issued first.
//! - `LatestIssuedWins`: completions carrying an outdated ticket are
//!   dropped without touching status or payload.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message recorded when an in-flight request is dropped before settling.
pub const CANCELLED_MESSAGE: &str = "Request was cancelled";

// =============================================================================
// Operation
// =============================================================================

/// Every remote operation the console tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Login,
    Register,
    ValidateToken,
    FetchProducts,
    CreateProduct,
    UpdateProduct,
    AdjustStock,
    DeleteProduct,
    FetchInventoryValue,
    FetchCategoryValues,
    FetchIncomeStats,
    FetchDailyIncome,
    GenerateBill,
    FetchBills,
    FetchBill,
    FetchTodayIncome,
    UpdateTodayIncome,
}

impl Operation {
    /// Stable name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Login => "auth/login",
            Operation::Register => "auth/register",
            Operation::ValidateToken => "auth/validate_token",
            Operation::FetchProducts => "products/fetch",
            Operation::CreateProduct => "products/create",
            Operation::UpdateProduct => "products/update",
            Operation::AdjustStock => "products/adjust_stock",
            Operation::DeleteProduct => "products/delete",
            Operation::FetchInventoryValue => "products/inventory_value",
            Operation::FetchCategoryValues => "products/category_values",
            Operation::FetchIncomeStats => "products/income_stats",
            Operation::FetchDailyIncome => "products/daily_income",
            Operation::GenerateBill => "bills/generate",
            Operation::FetchBills => "bills/fetch",
            Operation::FetchBill => "bills/fetch_one",
            Operation::FetchTodayIncome => "bills/today_income",
            Operation::UpdateTodayIncome => "bills/update_today_income",
        }
    }

    /// Message shown when a failure carries no usable message of its own.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::Login => "Login failed",
            Operation::Register => "Registration failed",
            Operation::ValidateToken => "Session expired, please sign in again",
            Operation::FetchProducts => "Failed to fetch products",
            Operation::CreateProduct => "Failed to create product",
            Operation::UpdateProduct => "Failed to update product",
            Operation::AdjustStock => "Failed to update stock",
            Operation::DeleteProduct => "Failed to delete product",
            Operation::FetchInventoryValue => "Failed to fetch inventory value",
            Operation::FetchCategoryValues => "Failed to fetch category-wise value",
            Operation::FetchIncomeStats => "Failed to fetch income statistics",
            Operation::FetchDailyIncome => "Failed to fetch daily income statistics",
            Operation::GenerateBill => "Failed to generate bill",
            Operation::FetchBills => "Failed to fetch bills",
            Operation::FetchBill => "Failed to fetch bill",
            Operation::FetchTodayIncome => "Failed to fetch today's income",
            Operation::UpdateTodayIncome => "Failed to update income",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Status & Policy
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

/// Which completion wins when requests for one operation overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    #[default]
    LastCompletionWins,
    LatestIssuedWins,
}

impl std::str::FromStr for StalePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "last_completion_wins" | "last_completion" => Ok(StalePolicy::LastCompletionWins),
            "latest_issued_wins" | "latest_issued" => Ok(StalePolicy::LatestIssuedWins),
            other => Err(format!(
                "Unknown stale policy: '{}'. Valid options: last_completion_wins, latest_issued_wins",
                other
            )),
        }
    }
}

/// Proof of issuance handed out by [`OperationTable::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub op: Operation,
    pub generation: u64,
}

// =============================================================================
// Operation State
// =============================================================================

/// Lifecycle state of one operation.
///
/// ## Invariants
/// - `status == Rejected` ⇒ `error.is_some()`
/// - `status == Fulfilled` ⇒ `error.is_none()`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationState {
    pub status: OpStatus,
    pub error: Option<String>,
    /// Generation of the most recent `begin()`.
    pub issued: u64,
    /// Generation of the most recent accepted completion.
    pub settled: u64,
}

impl OperationState {
    pub fn is_loading(&self) -> bool {
        self.status == OpStatus::Pending
    }

    /// True when a newer request has been issued since `ticket`.
    pub fn is_stale(&self, ticket: Ticket) -> bool {
        ticket.generation < self.issued
    }

    fn accepts(&self, ticket: Ticket, policy: StalePolicy) -> bool {
        match policy {
            StalePolicy::LastCompletionWins => true,
            StalePolicy::LatestIssuedWins => !self.is_stale(ticket),
        }
    }
}

// =============================================================================
// Operation Table
// =============================================================================

/// One [`OperationState`] per [`Operation`], plus the stale policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationTable {
    #[serde(default)]
    policy: StalePolicy,
    #[serde(default)]
    states: HashMap<Operation, OperationState>,
}

impl OperationTable {
    pub fn new(policy: StalePolicy) -> Self {
        OperationTable {
            policy,
            states: HashMap::new(),
        }
    }

    pub fn policy(&self) -> StalePolicy {
        self.policy
    }

    /// Current state of `op` (idle if never issued).
    pub fn get(&self, op: Operation) -> OperationState {
        self.states.get(&op).cloned().unwrap_or_default()
    }

    pub fn status(&self, op: Operation) -> OpStatus {
        self.states.get(&op).map(|s| s.status).unwrap_or_default()
    }

    pub fn error(&self, op: Operation) -> Option<&str> {
        self.states.get(&op).and_then(|s| s.error.as_deref())
    }

    pub fn is_loading(&self, op: Operation) -> bool {
        self.states.get(&op).is_some_and(OperationState::is_loading)
    }

    /// Marks `op` pending, clears its error, and issues a ticket.
    pub fn begin(&mut self, op: Operation) -> Ticket {
        let state = self.states.entry(op).or_default();
        state.issued += 1;
        state.status = OpStatus::Pending;
        state.error = None;
        Ticket {
            op,
            generation: state.issued,
        }
    }

    /// Whether a completion for `ticket` would be applied right now.
    ///
    /// Callers check this before reducing a payload into the store so that
    /// a dropped completion leaves the payload untouched as well.
    pub fn accepts(&self, ticket: Ticket) -> bool {
        self.states
            .get(&ticket.op)
            .map(|s| s.accepts(ticket, self.policy))
            .unwrap_or(false)
    }

    /// Records a successful completion. Returns false if it was dropped.
    pub fn fulfill(&mut self, ticket: Ticket) -> bool {
        let policy = self.policy;
        match self.states.get_mut(&ticket.op) {
            Some(state) if state.accepts(ticket, policy) => {
                state.status = OpStatus::Fulfilled;
                state.error = None;
                state.settled = ticket.generation;
                true
            }
            _ => false,
        }
    }

    /// Records a failed completion. Returns false if it was dropped.
    ///
    /// A blank message is replaced with the operation's fallback.
    pub fn reject(&mut self, ticket: Ticket, message: impl Into<String>) -> bool {
        let policy = self.policy;
        let mut message = message.into();
        if message.trim().is_empty() {
            message = ticket.op.fallback_message().to_string();
        }
        match self.states.get_mut(&ticket.op) {
            Some(state) if state.accepts(ticket, policy) => {
                state.status = OpStatus::Rejected;
                state.error = Some(message);
                state.settled = ticket.generation;
                true
            }
            _ => false,
        }
    }

    /// Settles a request that was dropped before completing.
    ///
    /// Only the newest issuance can be abandoned, and only while still
    /// pending; an older request being dropped never masks a newer one.
    pub fn abandon(&mut self, ticket: Ticket) -> bool {
        match self.states.get_mut(&ticket.op) {
            Some(state)
                if state.status == OpStatus::Pending && ticket.generation == state.issued =>
            {
                state.status = OpStatus::Rejected;
                state.error = Some(CANCELLED_MESSAGE.to_string());
                state.settled = ticket.generation;
                true
            }
            _ => false,
        }
    }

    /// Dismisses a displayed error. A rejected operation returns to idle.
    pub fn clear_error(&mut self, op: Operation) {
        if let Some(state) = self.states.get_mut(&op) {
            state.error = None;
            if state.status == OpStatus::Rejected {
                state.status = OpStatus::Idle;
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
