// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by the expense store, the analytics engine and the report builder.
#[derive(Debug, Error)]
pub enum OutlayError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Expense store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
    #[error("Invalid expense: {0}")]
    Validation(String),
    #[error("Expense {0} not found")]
    ExpenseNotFound(Uuid),
    #[error("User '{0}' not found")]
    UserNotFound(String),
    #[error("Report rendering failed: {0}")]
    Render(String),
}

impl OutlayError {
    /// True when the caller sent something unusable (bad period, bad input,
    /// unknown record) rather than the store or renderer failing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OutlayError::InvalidPeriod(_)
                | OutlayError::Validation(_)
                | OutlayError::ExpenseNotFound(_)
                | OutlayError::UserNotFound(_)
        )
    }
}

pub type Result<T, E = OutlayError> = std::result::Result<T, E>;
