//! Dispatch board: route cards and the arrival workflow.

pub mod card;
pub mod completion;
pub mod error;

pub use card::{format_elapsed, CardState, DispatchCard};
pub use completion::{CompletionOutcome, RatingPolicy, RouteCompletion, RouteCompletionService};
pub use error::DispatchError;
