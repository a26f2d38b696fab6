//! # Product Commands
//!
//! Product CRUD, manual stock corrections and the dashboard aggregates.
//!
//! ## Stock Adjustment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Dialog → Product Update                        │
//! │                                                                         │
//! │  adjust_stock("p1", Remove 3)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cached product from ProductStore ── missing? ──► "Product not found"  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  product.adjusted_draft(adjustment) ── below zero? ──► rejected        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PATCH /products/p1 (full draft, new currentStock)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  replace_product(updated) under Operation::AdjustStock                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Expired Tokens
//! A 401 on the product list means the token is no longer honored: the
//! session is forced invalid and the persisted token erased.

use bakery_client::BakeryApi;
use bakery_core::validation::{validate_date_range, validate_product_draft};
use bakery_core::{
    CategoryValue, CoreError, DailyIncomeSeries, DateRange, IncomeStats, InventorySummary,
    Operation, Product, ProductDraft, StockAdjustment, ValidationError,
};
use futures_util::TryFutureExt;
use tracing::{debug, info, warn};

use crate::dispatch::dispatch;
use crate::error::{ApiError, ConsoleError, ConsoleResult};
use crate::state::AppState;

/// Period used when the caller does not name one.
pub const DEFAULT_INCOME_PERIOD: &str = "daily";

// =============================================================================
// Work
// =============================================================================

async fn create_work<A: BakeryApi>(api: &A, draft: &ProductDraft) -> ConsoleResult<Product> {
    validate_product_draft(draft)?;
    Ok(api.create_product(draft).await?)
}

async fn update_work<A: BakeryApi>(api: &A, id: &str, draft: &ProductDraft) -> ConsoleResult<Product> {
    validate_product_draft(draft)?;
    Ok(api.update_product(id, draft).await?)
}

async fn adjust_work<A: BakeryApi>(
    api: &A,
    id: &str,
    cached: Option<Product>,
    adjustment: &StockAdjustment,
) -> ConsoleResult<Product> {
    let product = cached.ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
    let draft = product.adjusted_draft(adjustment)?;
    Ok(api.update_product(&product.id, &draft).await?)
}

async fn income_stats_work<A: BakeryApi>(api: &A, period: &str) -> ConsoleResult<IncomeStats> {
    if period.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "period".to_string(),
        }
        .into());
    }
    Ok(api.income_stats(period).await?)
}

async fn daily_income_work<A: BakeryApi>(
    api: &A,
    range: &DateRange,
) -> ConsoleResult<DailyIncomeSeries> {
    validate_date_range(range)?;
    Ok(api.daily_income(range).await?)
}

/// The backend refused our token: invalidate and erase it.
fn purge_session<A>(state: &AppState<A>) -> Result<(), ApiError> {
    let effect = state.session().update(|s| s.session.force_invalid());
    warn!("Backend rejected the session token; signing out");
    state.apply_token_effect(&effect)?;
    Ok(())
}

// =============================================================================
// Products
// =============================================================================

pub async fn fetch_products<A: BakeryApi>(state: &AppState<A>) -> Result<Vec<Product>, ApiError> {
    debug!("fetch_products");
    let work = state.api().list_products().map_err(ConsoleError::from);
    let result = dispatch(state.products(), Operation::FetchProducts, work, |s, products| {
        s.replace_products(products.clone())
    })
    .await;

    match result {
        Err(err) if err.is_unauthorized() => {
            purge_session(state)?;
            Err(err)
        }
        other => other,
    }
}

pub async fn create_product<A: BakeryApi>(
    state: &AppState<A>,
    draft: ProductDraft,
) -> Result<Product, ApiError> {
    debug!(name = %draft.name, "create_product");
    let work = create_work(state.api(), &draft);
    let product = dispatch(state.products(), Operation::CreateProduct, work, |s, product| {
        s.push_product(product.clone())
    })
    .await?;
    info!(product_id = %product.id, "Product created");
    Ok(product)
}

pub async fn update_product<A: BakeryApi>(
    state: &AppState<A>,
    id: &str,
    draft: ProductDraft,
) -> Result<Product, ApiError> {
    debug!(product_id = %id, "update_product");
    let work = update_work(state.api(), id, &draft);
    let product = dispatch(state.products(), Operation::UpdateProduct, work, |s, product| {
        s.replace_product(product.clone())
    })
    .await?;
    info!(product_id = %product.id, "Product updated");
    Ok(product)
}

/// Applies a stock correction to a product from the cached list.
pub async fn adjust_stock<A: BakeryApi>(
    state: &AppState<A>,
    product_id: &str,
    adjustment: StockAdjustment,
) -> Result<Product, ApiError> {
    debug!(product_id = %product_id, kind = ?adjustment.kind, quantity = adjustment.quantity, "adjust_stock");
    let cached = state.products().read(|s| s.find(product_id).cloned());
    let work = adjust_work(state.api(), product_id, cached, &adjustment);
    let product = dispatch(state.products(), Operation::AdjustStock, work, |s, product| {
        s.replace_product(product.clone())
    })
    .await?;
    info!(product_id = %product.id, stock = product.current_stock, "Stock adjusted");
    Ok(product)
}

pub async fn delete_product<A: BakeryApi>(state: &AppState<A>, id: &str) -> Result<(), ApiError> {
    debug!(product_id = %id, "delete_product");
    let work = state.api().delete_product(id).map_err(ConsoleError::from);
    dispatch(state.products(), Operation::DeleteProduct, work, |s, _| {
        s.remove_product(id)
    })
    .await?;
    info!(product_id = %id, "Product deleted");
    Ok(())
}

/// Selects a cached product for the detail view.
pub fn select_product<A>(state: &AppState<A>, id: &str) -> Option<Product> {
    state.products().update(|s| s.select(id))
}

// =============================================================================
// Dashboard Aggregates
// =============================================================================

pub async fn fetch_inventory_value<A: BakeryApi>(
    state: &AppState<A>,
) -> Result<InventorySummary, ApiError> {
    debug!("fetch_inventory_value");
    let work = state.api().inventory_total().map_err(ConsoleError::from);
    dispatch(state.products(), Operation::FetchInventoryValue, work, |s, summary| {
        s.inventory_summary = Some(summary.clone())
    })
    .await
}

pub async fn fetch_category_values<A: BakeryApi>(
    state: &AppState<A>,
) -> Result<Vec<CategoryValue>, ApiError> {
    debug!("fetch_category_values");
    let work = state.api().category_values().map_err(ConsoleError::from);
    dispatch(state.products(), Operation::FetchCategoryValues, work, |s, values| {
        s.category_values = values.clone()
    })
    .await
}

pub async fn fetch_income_stats<A: BakeryApi>(
    state: &AppState<A>,
    period: Option<&str>,
) -> Result<IncomeStats, ApiError> {
    let period = period.unwrap_or(DEFAULT_INCOME_PERIOD);
    debug!(period, "fetch_income_stats");
    let work = income_stats_work(state.api(), period);
    dispatch(state.products(), Operation::FetchIncomeStats, work, |s, stats| {
        s.income_stats = Some(stats.clone())
    })
    .await
}

pub async fn fetch_daily_income<A: BakeryApi>(
    state: &AppState<A>,
    range: DateRange,
) -> Result<DailyIncomeSeries, ApiError> {
    debug!(start = %range.start, end = %range.end, "fetch_daily_income");
    let work = daily_income_work(state.api(), &range);
    dispatch(state.products(), Operation::FetchDailyIncome, work, |s, series| {
        s.daily_income = Some(series.clone())
    })
    .await
}

// =============================================================================
// Flags
// =============================================================================

/// Dismisses the error shown for a product operation.
pub fn clear_error<A>(state: &AppState<A>, op: Operation) {
    state.products().update(|s| s.ops.clear_error(op));
}

pub fn clear_success<A>(state: &AppState<A>) {
    state.products().update(|s| s.last_success = false);
}
