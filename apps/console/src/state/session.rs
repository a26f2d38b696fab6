//! # Session State
//!
//! The in-memory [`Session`] plus lifecycle bookkeeping for the three
//! auth operations (login, register, validate token).

use bakery_core::{Operation, OperationTable, Session, StalePolicy};
use serde::Serialize;

use super::store::Tracked;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    pub session: Session,
    pub ops: OperationTable,
}

impl SessionState {
    pub fn boot(persisted: Option<String>, policy: StalePolicy) -> Self {
        SessionState {
            session: Session::boot(persisted),
            ops: OperationTable::new(policy),
        }
    }
}

impl Tracked for SessionState {
    fn ops_mut(&mut self) -> &mut OperationTable {
        &mut self.ops
    }

    fn on_abandon(&mut self, op: Operation) {
        if matches!(
            op,
            Operation::Login | Operation::Register | Operation::ValidateToken
        ) {
            self.session.abandon_pending();
        }
    }
}
