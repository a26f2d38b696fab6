//! # Product Store
//!
//! Cached product list, the selected product, and the dashboard
//! aggregates.
//!
//! ## Reducers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Store Reducers                               │
//! │                                                                         │
//! │  Fulfilled operation        Reducer                Effect               │
//! │  ───────────────────        ───────                ──────               │
//! │                                                                         │
//! │  FetchProducts ───────────► replace_products() ──► products = payload   │
//! │  CreateProduct ───────────► push_product() ──────► products.push(p)     │
//! │  UpdateProduct/AdjustStock► replace_product() ───► products[id] = p     │
//! │  DeleteProduct ───────────► remove_product() ────► products.retain(..)  │
//! │  FetchInventoryValue ─────► inventory_summary = payload                 │
//! │  FetchCategoryValues ─────► category_values = payload                   │
//! │  FetchIncomeStats ────────► income_stats = payload                      │
//! │  FetchDailyIncome ────────► daily_income = payload                      │
//! │                                                                         │
//! │  Rejected operations never reach a reducer: payloads stay as they were │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bakery_core::{
    CategoryValue, DailyIncomeSeries, IncomeStats, InventorySummary, OperationTable, Product,
    StalePolicy,
};
use serde::Serialize;

use super::store::Tracked;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStore {
    pub products: Vec<Product>,
    pub current_product: Option<Product>,
    pub inventory_summary: Option<InventorySummary>,
    pub category_values: Vec<CategoryValue>,
    pub income_stats: Option<IncomeStats>,
    pub daily_income: Option<DailyIncomeSeries>,
    /// Set by a fulfilled mutation, cleared by `clear_success`.
    pub last_success: bool,
    pub ops: OperationTable,
}

impl ProductStore {
    pub fn new(policy: StalePolicy) -> Self {
        ProductStore {
            ops: OperationTable::new(policy),
            ..ProductStore::default()
        }
    }

    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn replace_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    pub fn push_product(&mut self, product: Product) {
        self.products.push(product);
        self.last_success = true;
    }

    /// Replaces the product with the same id. Unknown ids leave the list
    /// unchanged.
    pub fn replace_product(&mut self, product: Product) {
        if let Some(slot) = self.products.iter_mut().find(|p| p.id == product.id) {
            *slot = product.clone();
        }
        if self
            .current_product
            .as_ref()
            .is_some_and(|current| current.id == product.id)
        {
            self.current_product = Some(product);
        }
        self.last_success = true;
    }

    pub fn remove_product(&mut self, id: &str) {
        self.products.retain(|p| p.id != id);
        if self.current_product.as_ref().is_some_and(|p| p.id == id) {
            self.current_product = None;
        }
        self.last_success = true;
    }

    /// Selects a cached product for the detail view.
    pub fn select(&mut self, id: &str) -> Option<Product> {
        self.current_product = self.find(id).cloned();
        self.current_product.clone()
    }

    pub fn low_stock(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_low_stock())
    }
}

impl Tracked for ProductStore {
    fn ops_mut(&mut self) -> &mut OperationTable {
        &mut self.ops
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
