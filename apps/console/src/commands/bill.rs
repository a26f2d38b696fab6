//! # Bill Commands
//!
//! Bill generation, history and today's income.
//!
//! ## Generate Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Bill Generation                                      │
//! │                                                                         │
//! │  generate_bill(request)                                                 │
//! │       │                                                                 │
//! │       ├── validate_bill_request ── empty / qty < 1 ──► rejected         │
//! │       ▼                                                                 │
//! │  POST /bills/generate ──► current_bill = bill                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  fetch_today_income()  (tracked separately; its failure does not       │
//! │                         fail the generated bill)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bakery_client::BakeryApi;
use bakery_core::validation::{validate_bill_request, validate_income};
use bakery_core::{Bill, BillRequest, Money, Operation};
use futures_util::TryFutureExt;
use tracing::{debug, info, warn};

use crate::dispatch::dispatch;
use crate::error::{ApiError, ConsoleError, ConsoleResult};
use crate::state::AppState;

async fn generate_work<A: BakeryApi>(api: &A, request: &BillRequest) -> ConsoleResult<Bill> {
    validate_bill_request(request)?;
    Ok(api.generate_bill(request).await?)
}

async fn set_income_work<A: BakeryApi>(api: &A, amount: Money) -> ConsoleResult<Money> {
    validate_income(amount)?;
    Ok(api.update_today_income(amount).await?)
}

/// Generates a bill and refreshes today's income.
pub async fn generate_bill<A: BakeryApi>(
    state: &AppState<A>,
    request: BillRequest,
) -> Result<Bill, ApiError> {
    debug!(lines = request.items.len(), payment = %request.payment_method, "generate_bill");
    let work = generate_work(state.api(), &request);
    let bill = dispatch(state.bills(), Operation::GenerateBill, work, |s, bill| {
        s.set_current(bill.clone())
    })
    .await?;
    info!(bill_id = %bill.id, total = %bill.total_cost, "Bill generated");

    if let Err(err) = fetch_today_income(state).await {
        warn!(error = %err, "Could not refresh today's income after billing");
    }
    Ok(bill)
}

/// Running total for a bill being composed, from the cached product list.
///
/// `None` when the quantities are too large for the total to be shown.
pub fn preview_bill<A>(state: &AppState<A>, request: &BillRequest) -> Option<Money> {
    state
        .products()
        .read(|s| request.preview_total(&s.products))
}

pub async fn fetch_bills<A: BakeryApi>(state: &AppState<A>) -> Result<Vec<Bill>, ApiError> {
    debug!("fetch_bills");
    let work = state.api().list_bills().map_err(ConsoleError::from);
    dispatch(state.bills(), Operation::FetchBills, work, |s, bills| {
        s.replace_bills(bills.clone())
    })
    .await
}

pub async fn fetch_bill<A: BakeryApi>(state: &AppState<A>, id: &str) -> Result<Bill, ApiError> {
    debug!(bill_id = %id, "fetch_bill");
    let work = state.api().get_bill(id).map_err(ConsoleError::from);
    dispatch(state.bills(), Operation::FetchBill, work, |s, bill| {
        s.set_current(bill.clone())
    })
    .await
}

pub async fn fetch_today_income<A: BakeryApi>(state: &AppState<A>) -> Result<Money, ApiError> {
    debug!("fetch_today_income");
    let work = state.api().today_income().map_err(ConsoleError::from);
    dispatch(state.bills(), Operation::FetchTodayIncome, work, |s, amount| {
        s.set_today_income(*amount)
    })
    .await
}

/// Manual correction of today's income figure.
pub async fn update_today_income<A: BakeryApi>(
    state: &AppState<A>,
    amount: Money,
) -> Result<Money, ApiError> {
    debug!(amount = %amount, "update_today_income");
    let work = set_income_work(state.api(), amount);
    let updated = dispatch(state.bills(), Operation::UpdateTodayIncome, work, |s, amount| {
        s.set_today_income(*amount)
    })
    .await?;
    info!(amount = %updated, "Today's income updated");
    Ok(updated)
}

pub fn clear_current_bill<A>(state: &AppState<A>) {
    state.bills().update(|s| s.clear_current());
}

/// Dismisses the error shown for a bill operation.
pub fn clear_error<A>(state: &AppState<A>, op: Operation) {
    state.bills().update(|s| s.ops.clear_error(op));
}
