//! Periodic messenger evaluations.

pub mod book;
pub mod types;

pub use book::{EvaluationBook, NewEvaluation};
pub use types::{
    default_questions, total_score, EvaluationCategory, EvaluationError, EvaluationQuestion,
    MessengerEvaluation,
};
