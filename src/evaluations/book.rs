//! Evaluation storage.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{total_score, EvaluationError, EvaluationQuestion, MessengerEvaluation};
use crate::storage::collection::{append, load};
use crate::storage::{names, CollectionStore};

/// A filled-in questionnaire ready to be saved.
#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub messenger_id: String,
    pub messenger_name: String,
    pub evaluated_by: String,
    pub evaluated_at: DateTime<Utc>,
    pub questions: Vec<EvaluationQuestion>,
    pub notes: Option<String>,
}

/// Messenger evaluations over the collection store.
pub struct EvaluationBook {
    store: Arc<dyn CollectionStore>,
}

impl EvaluationBook {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Validate and save an evaluation. Returns the stored record.
    pub fn save_evaluation(&self, evaluation: NewEvaluation) -> Result<MessengerEvaluation, EvaluationError> {
        if evaluation.questions.is_empty() {
            return Err(EvaluationError::NoQuestions);
        }
        if let Some(q) = evaluation
            .questions
            .iter()
            .find(|q| !(1..=5).contains(&q.rating))
        {
            return Err(EvaluationError::InvalidRating {
                question: q.id.clone(),
                rating: q.rating,
            });
        }

        let notes = evaluation
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let record = MessengerEvaluation {
            id: Uuid::new_v4().to_string(),
            messenger_id: evaluation.messenger_id,
            messenger_name: evaluation.messenger_name,
            evaluated_by: evaluation.evaluated_by,
            evaluated_at: evaluation.evaluated_at,
            total_score: total_score(&evaluation.questions),
            questions: evaluation.questions,
            notes,
        };
        append(self.store.as_ref(), names::MESSENGER_EVALUATIONS, &record)?;

        tracing::info!(
            "Saved evaluation {} for messenger {} (score {:.1})",
            record.id,
            record.messenger_id,
            record.total_score
        );

        Ok(record)
    }

    /// Evaluations of one messenger, newest first.
    pub fn messenger_evaluations(&self, messenger_id: &str) -> Result<Vec<MessengerEvaluation>, EvaluationError> {
        let mut evaluations: Vec<MessengerEvaluation> =
            load(self.store.as_ref(), names::MESSENGER_EVALUATIONS)?;
        evaluations.retain(|e| e.messenger_id == messenger_id);
        evaluations.sort_by(|a, b| b.evaluated_at.cmp(&a.evaluated_at));
        Ok(evaluations)
    }
}
