use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    Question, QuestionId, ScoreDraft, ScoreId, ScoreRecord, UserId, ValidatedQuestion,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Which credential table an account lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    User,
    Admin,
}

/// Persisted password hash for a user or admin account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub account: String,
    pub password_hash: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository contract for the question bank.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// All questions ordered by id ascending.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the questions cannot be read.
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// Insert a validated question and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn insert_question(&self, question: &ValidatedQuestion)
    -> Result<QuestionId, StorageError>;

    /// Delete a question. Score responses referencing it are kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no question has this id.
    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError>;
}

/// Append-only store of submitted attempts.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Persist a computed attempt; the store assigns the id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn append_score(
        &self,
        draft: &ScoreDraft,
        submitted_at: DateTime<Utc>,
    ) -> Result<ScoreRecord, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_score(&self, id: ScoreId) -> Result<ScoreRecord, StorageError>;

    /// A user's attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_scores_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<ScoreRecord>, StorageError>;

    /// Every attempt, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError>;

    /// Number of stored responses that answered the given question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn count_responses_for_question(&self, id: QuestionId) -> Result<u64, StorageError>;
}

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn get_credential(
        &self,
        kind: AccountKind,
        account: &str,
    ) -> Result<Option<CredentialRecord>, StorageError>;

    /// Create or replace an account's hash. Returns `true` when the account was created.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the credential cannot be written.
    async fn upsert_credential(
        &self,
        kind: AccountKind,
        record: &CredentialRecord,
    ) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn count_credentials(&self, kind: AccountKind) -> Result<u64, StorageError>;
}

fn newest_first(scores: &mut [ScoreRecord]) {
    scores.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

fn limit_len(limit: u32) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

#[derive(Default)]
struct Counters {
    next_question: u64,
    next_score: u64,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<BTreeMap<QuestionId, Question>>>,
    scores: Arc<Mutex<Vec<ScoreRecord>>>,
    credentials: Arc<Mutex<HashMap<(AccountKind, String), CredentialRecord>>>,
    counters: Arc<Mutex<Counters>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn insert_question(
        &self,
        question: &ValidatedQuestion,
    ) -> Result<QuestionId, StorageError> {
        let id = {
            let mut counters = self.counters.lock().map_err(poisoned)?;
            counters.next_question += 1;
            QuestionId::new(counters.next_question)
        };
        let mut guard = self.questions.lock().map_err(poisoned)?;
        guard.insert(id, question.clone().assign_id(id));
        Ok(id)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let mut guard = self.questions.lock().map_err(poisoned)?;
        guard.remove(&id).map(|_| ()).ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ScoreRepository for InMemoryRepository {
    async fn append_score(
        &self,
        draft: &ScoreDraft,
        submitted_at: DateTime<Utc>,
    ) -> Result<ScoreRecord, StorageError> {
        let id = {
            let mut counters = self.counters.lock().map_err(poisoned)?;
            counters.next_score += 1;
            ScoreId::new(counters.next_score)
        };
        let record = draft.clone().assign(id, submitted_at);
        let mut guard = self.scores.lock().map_err(poisoned)?;
        guard.push(record.clone());
        Ok(record)
    }

    async fn get_score(&self, id: ScoreId) -> Result<ScoreRecord, StorageError> {
        let guard = self.scores.lock().map_err(poisoned)?;
        guard
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_scores_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let guard = self.scores.lock().map_err(poisoned)?;
        let mut found: Vec<_> = guard
            .iter()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut found);
        found.truncate(limit_len(limit));
        Ok(found)
    }

    async fn list_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError> {
        let guard = self.scores.lock().map_err(poisoned)?;
        let mut found = guard.clone();
        newest_first(&mut found);
        found.truncate(limit_len(limit));
        Ok(found)
    }

    async fn count_responses_for_question(&self, id: QuestionId) -> Result<u64, StorageError> {
        let guard = self.scores.lock().map_err(poisoned)?;
        let count = guard
            .iter()
            .flat_map(|s| s.responses.iter())
            .filter(|r| r.question_id == id)
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl CredentialRepository for InMemoryRepository {
    async fn get_credential(
        &self,
        kind: AccountKind,
        account: &str,
    ) -> Result<Option<CredentialRecord>, StorageError> {
        let guard = self.credentials.lock().map_err(poisoned)?;
        Ok(guard.get(&(kind, account.to_string())).cloned())
    }

    async fn upsert_credential(
        &self,
        kind: AccountKind,
        record: &CredentialRecord,
    ) -> Result<bool, StorageError> {
        let mut guard = self.credentials.lock().map_err(poisoned)?;
        let previous = guard.insert((kind, record.account.clone()), record.clone());
        Ok(previous.is_none())
    }

    async fn count_credentials(&self, kind: AccountKind) -> Result<u64, StorageError> {
        let guard = self.credentials.lock().map_err(poisoned)?;
        Ok(guard.keys().filter(|(k, _)| *k == kind).count() as u64)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub scores: Arc<dyn ScoreRepository>,
    pub credentials: Arc<dyn CredentialRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let scores: Arc<dyn ScoreRepository> = Arc::new(repo.clone());
        let credentials: Arc<dyn CredentialRepository> = Arc::new(repo);
        Self {
            questions,
            scores,
            credentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{OptionLetter, QuestionDraft, Response};
    use quiz_core::time::fixed_now;

    fn validated(prompt: &str) -> ValidatedQuestion {
        QuestionDraft {
            kind: "mcq".into(),
            prompt: prompt.into(),
            options: ["1".into(), "2".into(), "3".into(), "4".into()],
            correct_answer: "A".into(),
            time_limit_secs: Some(15),
        }
        .validate()
        .unwrap()
    }

    fn draft(user: &str, score: u32) -> ScoreDraft {
        ScoreDraft {
            user_id: UserId::new(user).unwrap(),
            score,
            responses: vec![Response {
                question_id: QuestionId::new(1),
                selected: OptionLetter::A,
                is_correct: score > 0,
            }],
        }
    }

    #[tokio::test]
    async fn questions_are_listed_in_id_order_and_deletable() {
        let repo = InMemoryRepository::new();
        let first = repo.insert_question(&validated("one")).await.unwrap();
        let second = repo.insert_question(&validated("two")).await.unwrap();
        assert!(first < second);

        let listed = repo.list_questions().await.unwrap();
        assert_eq!(
            listed.iter().map(Question::id).collect::<Vec<_>>(),
            vec![first, second]
        );

        repo.delete_question(first).await.unwrap();
        assert!(repo.get_question(first).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_question(first).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn scores_list_newest_first_per_user() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let old = repo.append_score(&draft("amy", 1), now).await.unwrap();
        let newer = repo
            .append_score(&draft("amy", 0), now + Duration::minutes(5))
            .await
            .unwrap();
        repo.append_score(&draft("ben", 1), now).await.unwrap();

        let amy = repo
            .list_scores_for_user(&UserId::new("amy").unwrap(), 10)
            .await
            .unwrap();
        assert_eq!(
            amy.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![newer.id, old.id]
        );
        assert_eq!(repo.list_scores(2).await.unwrap().len(), 2);
        assert_eq!(
            repo.count_responses_for_question(QuestionId::new(1))
                .await
                .unwrap(),
            3
        );
        assert_eq!(repo.get_score(old.id).await.unwrap(), old);
    }

    #[tokio::test]
    async fn credentials_report_creation_once() {
        let repo = InMemoryRepository::new();
        let record = CredentialRecord {
            account: "amy".into(),
            password_hash: "h1".into(),
            updated_at: fixed_now(),
        };
        assert!(repo.upsert_credential(AccountKind::User, &record).await.unwrap());
        let updated = CredentialRecord {
            password_hash: "h2".into(),
            ..record
        };
        assert!(!repo.upsert_credential(AccountKind::User, &updated).await.unwrap());

        let fetched = repo
            .get_credential(AccountKind::User, "amy")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.password_hash, "h2");
        assert!(repo
            .get_credential(AccountKind::Admin, "amy")
            .await
            .unwrap()
            .is_none());
        assert_eq!(repo.count_credentials(AccountKind::Admin).await.unwrap(), 0);
    }
}
