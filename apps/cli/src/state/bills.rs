//! # Bill Store
//!
//! Open bills of the current session, keyed by bill id.
//!
//! ## Thread Safety
//! Bills are wrapped in `Arc<Mutex<T>>`: several front-end calls may touch
//! the same bill, and only one may change it at a time. A poisoned lock is
//! reported as an internal error rather than a panic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use divvy_core::{Bill, BillId};

use crate::error::ApiError;

/// Open bills, shared across commands.
#[derive(Debug, Clone, Default)]
pub struct BillStore {
    bills: Arc<Mutex<HashMap<BillId, Bill>>>,
}

impl BillStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<BillId, Bill>>, ApiError> {
        self.bills
            .lock()
            .map_err(|_| ApiError::internal("Bill store mutex poisoned"))
    }

    /// Adds a bill and returns its id.
    pub fn insert(&self, bill: Bill) -> Result<BillId, ApiError> {
        let id = bill.id().clone();
        self.lock()?.insert(id.clone(), bill);
        Ok(id)
    }

    /// Removes and returns a bill.
    pub fn remove(&self, bill_id: &BillId) -> Result<Bill, ApiError> {
        self.lock()?
            .remove(bill_id)
            .ok_or_else(|| ApiError::not_found("Bill", bill_id.as_str()))
    }

    /// Ids of every open bill.
    pub fn ids(&self) -> Result<Vec<BillId>, ApiError> {
        let mut ids: Vec<BillId> = self.lock()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Executes a function with read access to one bill.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let total = store.with_bill(&id, |bill| Ok(bill.total()?))?;
    /// ```
    pub fn with_bill<F, R>(&self, bill_id: &BillId, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&Bill) -> Result<R, ApiError>,
    {
        let bills = self.lock()?;
        let bill = bills
            .get(bill_id)
            .ok_or_else(|| ApiError::not_found("Bill", bill_id.as_str()))?;
        f(bill)
    }

    /// Executes a function with write access to one bill.
    pub fn with_bill_mut<F, R>(&self, bill_id: &BillId, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut Bill) -> Result<R, ApiError>,
    {
        let mut bills = self.lock()?;
        let bill = bills
            .get_mut(bill_id)
            .ok_or_else(|| ApiError::not_found("Bill", bill_id.as_str()))?;
        f(bill)
    }
}
