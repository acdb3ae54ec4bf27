//! Deposit Balance Model

use serde::{Deserialize, Serialize};

/// Deposit account balance for a student
///
/// Fetched fresh before every booking attempt. Never cached across an
/// orchestration boundary, so a stale read cannot leak into a later flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositBalance {
    /// Total amount held on the deposit account, in currency units
    pub total_balance: f64,
    /// Portion not locked by an active booking, in currency units
    pub available_balance: f64,
    /// Deposits submitted but not yet cleared, in currency units
    pub pending_deposits: f64,
}

impl DepositBalance {
    /// Whether the available balance covers the given amount
    pub fn can_cover(&self, amount: f64) -> bool {
        self.available_balance >= amount
    }
}
