//! Evaluation records and the standard questionnaire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StoreError;

/// Area of work a question covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationCategory {
    Punctuality,
    CustomerService,
    VehicleCare,
    Communication,
    Professionalism,
    Safety,
    Reliability,
    ProblemSolving,
}

impl EvaluationCategory {
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationCategory::Punctuality => "Punctuality",
            EvaluationCategory::CustomerService => "Customer service",
            EvaluationCategory::VehicleCare => "Vehicle care",
            EvaluationCategory::Communication => "Communication",
            EvaluationCategory::Professionalism => "Professionalism",
            EvaluationCategory::Safety => "Safety",
            EvaluationCategory::Reliability => "Reliability",
            EvaluationCategory::ProblemSolving => "Problem solving",
        }
    }
}

/// One rated question of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationQuestion {
    pub id: String,
    pub question: String,
    pub category: EvaluationCategory,
    /// 1-5, 0 while unanswered
    #[serde(default)]
    pub rating: u8,
}

/// A saved messenger evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessengerEvaluation {
    pub id: String,
    pub messenger_id: String,
    #[serde(default)]
    pub messenger_name: String,
    pub evaluated_by: String,
    pub evaluated_at: DateTime<Utc>,
    pub questions: Vec<EvaluationQuestion>,
    /// Mean rating, one decimal
    pub total_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The standard questionnaire, unanswered.
pub fn default_questions() -> Vec<EvaluationQuestion> {
    use EvaluationCategory::*;

    [
        ("q1", "Arrives on time for routes?", Punctuality),
        ("q2", "Treats clients well?", CustomerService),
        ("q3", "Keeps the vehicle in good condition?", VehicleCare),
        ("q4", "Responds quickly to messages?", Communication),
        ("q5", "Behaves professionally at work?", Professionalism),
        ("q6", "Follows safety rules?", Safety),
        ("q7", "Is dependable and responsible?", Reliability),
        ("q8", "Solves problems effectively?", ProblemSolving),
    ]
    .into_iter()
    .map(|(id, question, category)| EvaluationQuestion {
        id: id.to_string(),
        question: question.to_string(),
        category,
        rating: 0,
    })
    .collect()
}

/// Mean of the question ratings rounded to one decimal, 0 with no questions.
pub fn total_score(questions: &[EvaluationQuestion]) -> f64 {
    if questions.is_empty() {
        return 0.0;
    }
    let sum: u32 = questions.iter().map(|q| q.rating as u32).sum();
    let mean = sum as f64 / questions.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Evaluation errors.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Question {question} has rating {rating} (expected 1-5)")]
    InvalidRating { question: String, rating: u8 },

    #[error("Evaluation has no questions")]
    NoQuestions,
}
