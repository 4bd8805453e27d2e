use std::sync::Arc;

use quiz_core::model::{ScoreId, ScoreRecord, UserId};
use storage::repository::ScoreRepository;

use crate::error::ScoreServiceError;

/// Upper bound on rows returned by a single score listing.
pub const SCORE_LIST_LIMIT: u32 = 500;

/// Read side of the score store for dashboards and the admin table.
#[derive(Clone)]
pub struct ScoreService {
    scores: Arc<dyn ScoreRepository>,
}

impl ScoreService {
    #[must_use]
    pub fn new(scores: Arc<dyn ScoreRepository>) -> Self {
        Self { scores }
    }

    /// A user's attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` if repository access fails.
    pub async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ScoreRecord>, ScoreServiceError> {
        Ok(self
            .scores
            .list_scores_for_user(user_id, SCORE_LIST_LIMIT)
            .await?)
    }

    /// Every attempt, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` if repository access fails.
    pub async fn list_all(&self) -> Result<Vec<ScoreRecord>, ScoreServiceError> {
        Ok(self.scores.list_scores(SCORE_LIST_LIMIT).await?)
    }

    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` if the record is missing or unreadable.
    pub async fn get(&self, id: ScoreId) -> Result<ScoreRecord, ScoreServiceError> {
        Ok(self.scores.get_score(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use quiz_core::model::ScoreDraft;
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, StorageError};

    #[tokio::test]
    async fn lists_newest_first() {
        let repo = InMemoryRepository::new();
        let amy = UserId::new("amy").unwrap();
        let mut clock = fixed_clock();
        for score in 0..3 {
            repo.append_score(
                &ScoreDraft {
                    user_id: amy.clone(),
                    score,
                    responses: Vec::new(),
                },
                clock.now(),
            )
            .await
            .unwrap();
            clock.advance(Duration::minutes(1));
        }

        let svc = ScoreService::new(Arc::new(repo));
        let scores: Vec<u32> = svc
            .list_for_user(&amy)
            .await
            .unwrap()
            .iter()
            .map(|s| s.score)
            .collect();
        assert_eq!(scores, vec![2, 1, 0]);
        assert_eq!(svc.list_all().await.unwrap().len(), 3);
        assert!(svc
            .list_for_user(&UserId::new("ben").unwrap())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn get_returns_one_record_or_not_found() {
        let repo = InMemoryRepository::new();
        let record = repo
            .append_score(
                &ScoreDraft {
                    user_id: UserId::new("amy").unwrap(),
                    score: 4,
                    responses: Vec::new(),
                },
                fixed_now(),
            )
            .await
            .unwrap();

        let svc = ScoreService::new(Arc::new(repo));
        assert_eq!(svc.get(record.id).await.unwrap(), record);
        assert!(matches!(
            svc.get(ScoreId::new(999)).await,
            Err(ScoreServiceError::Storage(StorageError::NotFound))
        ));
    }
}
