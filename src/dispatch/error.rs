//! Dispatch error type.

use thiserror::Error;

use crate::gamification::GamificationError;
use crate::routes::RouteError;
use crate::storage::{ConfigError, StoreError};

/// Errors raised by route cards and route completion.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Cannot {action} a {from} route")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    #[error("Invalid star rating: {0} (expected 0-5)")]
    InvalidRating(u8),

    #[error("Route has no stops")]
    NoStops,

    #[error("Arrival is before departure")]
    ArrivalBeforeDeparture,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Route history error: {0}")]
    Route(#[from] RouteError),

    #[error("Gamification error: {0}")]
    Gamification(#[from] GamificationError),
}
