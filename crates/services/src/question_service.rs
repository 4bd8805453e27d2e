use std::sync::Arc;

use quiz_core::model::{Question, QuestionDraft, QuestionId};
use storage::repository::{QuestionRepository, ScoreRepository, StorageError};
use tracing::info;

use crate::error::QuestionServiceError;

/// Result of removing a question from the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Stored attempts still reference the deleted question.
    pub had_responses: bool,
}

/// Admin-side management of the question bank.
#[derive(Clone)]
pub struct QuestionService {
    questions: Arc<dyn QuestionRepository>,
    scores: Arc<dyn ScoreRepository>,
}

impl QuestionService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>, scores: Arc<dyn ScoreRepository>) -> Self {
        Self { questions, scores }
    }

    /// All questions ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if repository access fails.
    pub async fn list_questions(&self) -> Result<Vec<Question>, QuestionServiceError> {
        Ok(self.questions.list_questions().await?)
    }

    /// Validate and store a new question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Question` for validation failures.
    /// Returns `QuestionServiceError::Storage` if persistence fails.
    pub async fn add_question(
        &self,
        draft: QuestionDraft,
    ) -> Result<QuestionId, QuestionServiceError> {
        let validated = draft.validate()?;
        let id = self.questions.insert_question(&validated).await?;
        info!(question_id = %id, "question added");
        Ok(id)
    }

    /// Delete a question, reporting whether past attempts answered it.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::NotFound` if the id does not exist.
    /// Returns `QuestionServiceError::Storage` if repository access fails.
    pub async fn delete_question(
        &self,
        id: QuestionId,
    ) -> Result<DeleteOutcome, QuestionServiceError> {
        let responses = self.scores.count_responses_for_question(id).await?;
        match self.questions.delete_question(id).await {
            Ok(()) => {}
            Err(StorageError::NotFound) => return Err(QuestionServiceError::NotFound),
            Err(other) => return Err(other.into()),
        }
        info!(question_id = %id, responses, "question deleted");
        Ok(DeleteOutcome {
            had_responses: responses > 0,
        })
    }
}
