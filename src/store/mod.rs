pub mod ledger;
pub mod registry;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::LeaveError;
use ledger::LeaveLedger;
use registry::EmployeeRegistry;

/// Everything the service knows, from process start to shutdown.
#[derive(Debug)]
pub struct HrStore {
    pub registry: EmployeeRegistry,
    pub ledger: LeaveLedger,
}

impl HrStore {
    pub fn new(allowance: i64) -> Self {
        Self {
            registry: EmployeeRegistry::new(allowance),
            ledger: LeaveLedger::new(allowance),
        }
    }
}

/// Shared handle given to every worker through `web::Data`.
///
/// One lock covers both collections so an apply or decide sees the same
/// approved history from its balance check through its write.
#[derive(Debug)]
pub struct AppState {
    store: RwLock<HrStore>,
}

impl AppState {
    pub fn new(allowance: i64) -> Self {
        Self {
            store: RwLock::new(HrStore::new(allowance)),
        }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, HrStore>, LeaveError> {
        self.store.read().map_err(|e| {
            tracing::error!(error = %e, "HR store lock poisoned");
            LeaveError::Internal
        })
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, HrStore>, LeaveError> {
        self.store.write().map_err(|e| {
            tracing::error!(error = %e, "HR store lock poisoned");
            LeaveError::Internal
        })
    }
}
