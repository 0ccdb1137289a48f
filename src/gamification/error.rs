//! Gamification error type.

use thiserror::Error;

use crate::routes::RouteError;
use crate::storage::StoreError;

/// Errors raised by rules, scoring, the ledger and route completion.
#[derive(Debug, Error)]
pub enum GamificationError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Route history error: {0}")]
    Route(#[from] RouteError),

    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Messenger not found: {0}")]
    MessengerNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
