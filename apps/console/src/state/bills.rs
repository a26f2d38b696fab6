//! # Bill Store
//!
//! Bill history, the bill being viewed or just generated, and today's
//! income figure.

use bakery_core::{Bill, Money, OperationTable, StalePolicy};
use serde::Serialize;

use super::store::Tracked;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillStore {
    pub bills: Vec<Bill>,
    pub current_bill: Option<Bill>,
    pub today_income: Money,
    pub ops: OperationTable,
}

impl BillStore {
    pub fn new(policy: StalePolicy) -> Self {
        BillStore {
            ops: OperationTable::new(policy),
            ..BillStore::default()
        }
    }

    pub fn replace_bills(&mut self, bills: Vec<Bill>) {
        self.bills = bills;
    }

    /// Generated or fetched bill shown in the detail view.
    pub fn set_current(&mut self, bill: Bill) {
        self.current_bill = Some(bill);
    }

    pub fn clear_current(&mut self) {
        self.current_bill = None;
    }

    pub fn set_today_income(&mut self, amount: Money) {
        self.today_income = amount;
    }
}

impl Tracked for BillStore {
    fn ops_mut(&mut self) -> &mut OperationTable {
        &mut self.ops
    }
}
