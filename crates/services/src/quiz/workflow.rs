use std::sync::Arc;

use quiz_core::model::{ScoreDraft, ScoreId, UserId};
use quiz_core::session::QuizSession;
use storage::repository::{QuestionRepository, ScoreRepository};
use tracing::{info, warn};

use crate::Clock;
use crate::error::QuizError;

/// What happened to a computed score when it was written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Saved(ScoreId),
    /// The store rejected the record; the score is still shown locally.
    Failed(String),
}

/// Starts quiz sessions and records their results.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
    scores: Arc<dyn ScoreRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionRepository>,
        scores: Arc<dyn ScoreRepository>,
    ) -> Self {
        Self {
            clock,
            questions,
            scores,
        }
    }

    /// Fetch the question bank once and start a session over it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` for an empty bank and
    /// `QuizError::Storage` if the fetch fails. No session exists in either case.
    pub async fn start_quiz(&self, user_id: UserId) -> Result<QuizSession, QuizError> {
        let questions = self.questions.list_questions().await?;
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        let total = questions.len();
        let mut session = QuizSession::new(user_id, questions)?;
        session.start();
        info!(user_id = %session.user_id(), total, "quiz started");
        Ok(session)
    }

    /// Append a submitted attempt to the score store.
    ///
    /// Failures are logged and reported, never raised: the session stays submitted.
    pub async fn record_submission(&self, draft: &ScoreDraft) -> SubmissionStatus {
        let submitted_at = self.clock.now();
        match self.scores.append_score(draft, submitted_at).await {
            Ok(record) => {
                info!(
                    user_id = %record.user_id,
                    score_id = %record.id,
                    score = record.score,
                    answered = record.answered(),
                    "score recorded"
                );
                SubmissionStatus::Saved(record.id)
            }
            Err(err) => {
                warn!(user_id = %draft.user_id, score = draft.score, error = %err, "failed to record score");
                SubmissionStatus::Failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use quiz_core::model::{QuestionDraft, QuestionId, ScoreRecord};
    use quiz_core::session::SessionState;
    use quiz_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, StorageError};

    struct BrokenScores;

    #[async_trait]
    impl ScoreRepository for BrokenScores {
        async fn append_score(
            &self,
            _draft: &ScoreDraft,
            _submitted_at: DateTime<Utc>,
        ) -> Result<ScoreRecord, StorageError> {
            Err(StorageError::Connection("disk full".into()))
        }

        async fn get_score(&self, _id: ScoreId) -> Result<ScoreRecord, StorageError> {
            Err(StorageError::NotFound)
        }

        async fn list_scores_for_user(
            &self,
            _user_id: &UserId,
            _limit: u32,
        ) -> Result<Vec<ScoreRecord>, StorageError> {
            Ok(Vec::new())
        }

        async fn list_scores(&self, _limit: u32) -> Result<Vec<ScoreRecord>, StorageError> {
            Ok(Vec::new())
        }

        async fn count_responses_for_question(
            &self,
            _id: QuestionId,
        ) -> Result<u64, StorageError> {
            Ok(0)
        }
    }

    async fn seeded_repo() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        let validated = QuestionDraft {
            kind: "mcq".into(),
            prompt: "Q".into(),
            options: ["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: "A".into(),
            time_limit_secs: Some(10),
        }
        .validate()
        .unwrap();
        repo.insert_question(&validated).await.unwrap();
        repo
    }

    fn user() -> UserId {
        UserId::new("amy").unwrap()
    }

    #[tokio::test]
    async fn empty_bank_yields_no_session() {
        let repo = InMemoryRepository::new();
        let svc = QuizService::new(
            Clock::Fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        assert!(matches!(
            svc.start_quiz(user()).await,
            Err(QuizError::NoQuestions)
        ));
    }

    #[tokio::test]
    async fn started_session_is_in_progress() {
        let repo = seeded_repo().await;
        let svc = QuizService::new(
            Clock::Fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        let session = svc.start_quiz(user()).await.unwrap();
        assert_eq!(session.state(), SessionState::InProgress);
        assert!(session.timer_token().is_some());
    }

    #[tokio::test]
    async fn record_submission_stamps_clock_time() {
        let repo = seeded_repo().await;
        let svc = QuizService::new(
            Clock::Fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        let draft = ScoreDraft {
            user_id: user(),
            score: 0,
            responses: Vec::new(),
        };

        let SubmissionStatus::Saved(id) = svc.record_submission(&draft).await else {
            panic!("expected saved");
        };
        let stored = repo.get_score(id).await.unwrap();
        assert_eq!(stored.submitted_at, fixed_now());
    }

    #[tokio::test]
    async fn storage_failure_is_reported_not_raised() {
        let repo = seeded_repo().await;
        let svc = QuizService::new(
            Clock::Fixed(fixed_now()),
            Arc::new(repo),
            Arc::new(BrokenScores),
        );
        let draft = ScoreDraft {
            user_id: user(),
            score: 1,
            responses: Vec::new(),
        };
        assert!(matches!(
            svc.record_submission(&draft).await,
            SubmissionStatus::Failed(msg) if msg.contains("disk full")
        ));
    }
}
