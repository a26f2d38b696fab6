//! # Routes
//!
//! The console's views and the load commands each one issues when mounted.
//!
//! ```text
//! /login                  Login            public
//! /signup                 Signup           public
//! /inventory-dashboard    Dashboard        protected
//! /products               Products         protected
//! /bills                  Bills            protected
//! /bills/:id              BillDetail(id)   protected
//! /generate-bill          GenerateBill     protected
//! /, anything else        → /inventory-dashboard
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::DateRange;

/// Days of history the dashboard chart shows by default.
pub const DASHBOARD_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Signup,
    InventoryDashboard,
    Products,
    Bills,
    BillDetail(String),
    GenerateBill,
}

/// A data load a view performs on mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadCommand {
    FetchInventoryValue,
    FetchCategoryValues,
    FetchDailyIncome(DateRange),
    FetchProducts,
    FetchBills,
    FetchBill(String),
    FetchTodayIncome,
}

impl Route {
    /// Resolves a path. Unknown paths land on the dashboard.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["products"] => Route::Products,
            ["bills"] => Route::Bills,
            ["bills", id] => Route::BillDetail((*id).to_string()),
            ["generate-bill"] => Route::GenerateBill,
            _ => Route::InventoryDashboard,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::InventoryDashboard => "/inventory-dashboard".to_string(),
            Route::Products => "/products".to_string(),
            Route::Bills => "/bills".to_string(),
            Route::BillDetail(id) => format!("/bills/{}", id),
            Route::GenerateBill => "/generate-bill".to_string(),
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Signup)
    }

    /// Where an already signed-in user is sent instead of this route.
    pub fn authenticated_redirect(&self) -> Option<Route> {
        if self.is_protected() {
            None
        } else {
            Some(Route::InventoryDashboard)
        }
    }

    /// Loads issued when this view mounts.
    pub fn load_commands(&self, today: NaiveDate) -> Vec<LoadCommand> {
        match self {
            Route::Login | Route::Signup => Vec::new(),
            Route::InventoryDashboard => vec![
                LoadCommand::FetchInventoryValue,
                LoadCommand::FetchCategoryValues,
                LoadCommand::FetchDailyIncome(DateRange::last_days(today, DASHBOARD_DAYS)),
            ],
            Route::Products => vec![LoadCommand::FetchProducts],
            Route::Bills => vec![LoadCommand::FetchBills],
            Route::BillDetail(id) => vec![LoadCommand::FetchBill(id.clone())],
            Route::GenerateBill => vec![LoadCommand::FetchProducts, LoadCommand::FetchTodayIncome],
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
