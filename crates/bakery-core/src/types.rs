//! # Domain Types
//!
//! Typed schemas for everything the console exchanges with the bakery API.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Bill       │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (_id)       │   │  id (_id)       │   │  id (_id)       │       │
//! │  │  category       │   │  items[]        │   │  name, email    │       │
//! │  │  cost_price     │   │  total_cost     │   │  role           │       │
//! │  │  current_stock  │   │  payment_method │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  Dashboard aggregates: InventorySummary, CategoryValue,                │
//! │                        IncomeStats, DailyIncomeSeries                   │
//! │                                                                         │
//! │  Request bodies:       Credentials, Registration, ProductDraft,         │
//! │                        BillRequest                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! The backend is Mongo-backed: identifiers arrive as `_id` and fields are
//! camelCase. Every type accepts plain `id` as an alias so fixtures stay short.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::{stock_out_of_range, validate_stock_adjustment, MAX_STOCK_QUANTITY};

fn default_true() -> bool {
    true
}

// =============================================================================
// Users & Authentication
// =============================================================================

/// The signed-in console user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub email: String,

    #[serde(default)]
    pub role: Option<String>,
}

/// Login form body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Signup form body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Successful login: an opaque bearer token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSuccess {
    pub token: String,
    pub user: User,
}

// =============================================================================
// Products
// =============================================================================

/// A bakery product as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub category: String,

    /// Price used for billing and inventory valuation.
    pub cost_price: Money,

    /// Shelf price, if the backend tracks one separately.
    #[serde(default)]
    pub unit_price: Option<Money>,

    #[serde(default)]
    pub current_stock: i64,

    #[serde(default)]
    pub minimum_stock_level: Option<i64>,

    /// Unit of measure ("pcs", "kg", ...).
    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Product {
    /// True when stock has fallen to or below the configured minimum.
    pub fn is_low_stock(&self) -> bool {
        self.minimum_stock_level
            .map(|min| self.current_stock <= min)
            .unwrap_or(false)
    }

    /// Builds the update body that carries this product's fields unchanged.
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            category: self.category.clone(),
            cost_price: self.cost_price,
            current_stock: self.current_stock,
            is_active: self.is_active,
        }
    }

    /// Update body with `adjustment` applied to the cached stock.
    pub fn adjusted_draft(&self, adjustment: &StockAdjustment) -> CoreResult<ProductDraft> {
        validate_stock_adjustment(adjustment)?;
        let current_stock = adjustment
            .apply(self.current_stock)
            .filter(|stock| {
                adjustment.kind == AdjustmentKind::Remove || *stock <= MAX_STOCK_QUANTITY
            })
            .ok_or_else(stock_out_of_range)?;
        if current_stock < 0 {
            return Err(CoreError::InsufficientStock {
                name: self.name.clone(),
                available: self.current_stock,
                requested: adjustment.quantity,
            });
        }
        Ok(ProductDraft {
            current_stock,
            ..self.to_draft()
        })
    }
}

/// Create/update body for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub cost_price: Money,
    pub current_stock: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Direction of a manual stock correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    Add,
    Remove,
}

/// A manual stock correction entered from the stock dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub kind: AdjustmentKind,
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

impl StockAdjustment {
    pub fn add(quantity: i64) -> Self {
        StockAdjustment {
            kind: AdjustmentKind::Add,
            quantity,
            reason: None,
        }
    }

    pub fn remove(quantity: i64) -> Self {
        StockAdjustment {
            kind: AdjustmentKind::Remove,
            quantity,
            reason: None,
        }
    }

    /// Returns the stock level after applying this adjustment, or `None`
    /// when it does not fit in an `i64`.
    pub fn apply(&self, current: i64) -> Option<i64> {
        match self.kind {
            AdjustmentKind::Add => current.checked_add(self.quantity),
            AdjustmentKind::Remove => current.checked_sub(self.quantity),
        }
    }
}

// =============================================================================
// Bills
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Upi,
    /// Any method this console does not know about yet.
    #[serde(other)]
    Other,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Upi => write!(f, "upi"),
            PaymentMethod::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            other => Err(crate::error::ValidationError::InvalidFormat {
                field: "paymentMethod".to_string(),
                reason: format!("unknown payment method '{}'", other),
            }),
        }
    }
}

/// One requested line on the bill generator form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Body of `POST /bills/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRequest {
    pub items: Vec<BillLine>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl BillRequest {
    /// Running total shown while the bill is being composed.
    ///
    /// Lines whose product is not in `products`, or whose quantity is not
    /// positive, contribute nothing. The backend computes the real total.
    /// Returns `None` when the total does not fit in paise.
    pub fn preview_total(&self, products: &[Product]) -> Option<Money> {
        self.items
            .iter()
            .filter(|line| line.quantity > 0)
            .filter_map(|line| {
                products
                    .iter()
                    .find(|p| p.id == line.product_id)
                    .map(|p| p.cost_price.multiply_quantity(line.quantity))
            })
            .try_fold(Money::zero(), |total, line| total.checked_add(line?))
    }
}

/// Product reference embedded in a bill item (populated by the backend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A line of a generated bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,

    /// `None` when the product has since been deleted.
    #[serde(default)]
    pub product: Option<ProductRef>,

    pub quantity: i64,

    /// Line cost (unit cost × quantity).
    pub cost: Money,
}

impl BillItem {
    pub fn unit_cost(&self) -> Money {
        self.cost.divide_by_quantity(self.quantity)
    }

    pub fn product_name(&self) -> &str {
        self.product.as_ref().map(|p| p.name.as_str()).unwrap_or("N/A")
    }
}

/// A generated bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(default)]
    pub items: Vec<BillItem>,

    pub total_cost: Money,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Dashboard Aggregates
// =============================================================================

/// Totals shown in the dashboard summary cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventorySummary {
    pub total_products: u64,
    pub total_value: Money,
    pub total_categories: u64,
    pub low_stock_items: u64,
}

/// One slice of the category distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    #[serde(alias = "_id", alias = "category")]
    pub name: String,
    pub value: Money,
}

/// Income summary for a named period ("daily", "weekly", ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncomeStats {
    pub period: String,
    pub total_income: Money,
    #[serde(alias = "count")]
    pub bill_count: u64,
}

/// Income for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyIncome {
    pub date: NaiveDate,
    pub total_income: Money,
    #[serde(default, alias = "count")]
    pub bill_count: u64,
}

/// The daily income time series for a date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyIncomeSeries {
    #[serde(default)]
    pub stats: Vec<DailyIncome>,
}

impl DailyIncomeSeries {
    pub fn total(&self) -> Money {
        self.stats.iter().map(|d| d.total_income).sum()
    }
}

/// Inclusive calendar range for the daily income chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(rename = "startDate")]
    pub start: NaiveDate,
    #[serde(rename = "endDate")]
    pub end: NaiveDate,
}

impl DateRange {
    /// Default dashboard window: `days` days back through `today`.
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        DateRange {
            start: today - Duration::days(days),
            end: today,
        }
    }

    /// `YYYY-MM-DD` pair used in the query string.
    pub fn query_pair(&self) -> (String, String) {
        (
            self.start.format("%Y-%m-%d").to_string(),
            self.end.format("%Y-%m-%d").to_string(),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
