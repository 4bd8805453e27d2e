use std::sync::Arc;

use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::account_service::AccountService;
use crate::error::AppServicesError;
use crate::question_service::QuestionService;
use crate::quiz::{QuizRunner, QuizService};
use crate::score_service::ScoreService;

/// Credentials used to create the first admin when the admin table is empty.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    runner: Arc<QuizRunner>,
    questions: Arc<QuestionService>,
    accounts: Arc<AccountService>,
    scores: Arc<ScoreService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or admin bootstrap fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        admin: Option<AdminBootstrap>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let services = Self::from_storage(&storage, clock);
        if let Some(admin) = admin {
            services.bootstrap_admin(&admin).await?;
        }
        Ok(services)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let quiz = Arc::new(QuizService::new(
            clock,
            Arc::clone(&storage.questions),
            Arc::clone(&storage.scores),
        ));
        let runner = Arc::new(QuizRunner::new(Arc::clone(&quiz)));
        let questions = Arc::new(QuestionService::new(
            Arc::clone(&storage.questions),
            Arc::clone(&storage.scores),
        ));
        let accounts = Arc::new(AccountService::new(
            clock,
            Arc::clone(&storage.credentials),
        ));
        let scores = Arc::new(ScoreService::new(Arc::clone(&storage.scores)));

        Self {
            quiz,
            runner,
            questions,
            accounts,
            scores,
        }
    }

    /// Create the configured admin if no admin account exists.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Account` for blank credentials or storage failures.
    pub async fn bootstrap_admin(&self, admin: &AdminBootstrap) -> Result<bool, AppServicesError> {
        let created = self
            .accounts
            .ensure_admin(&admin.username, &admin.password)
            .await?;
        if created {
            info!(username = %admin.username, "bootstrapped admin account");
        }
        Ok(created)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn runner(&self) -> Arc<QuizRunner> {
        Arc::clone(&self.runner)
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionService> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    #[must_use]
    pub fn scores(&self) -> Arc<ScoreService> {
        Arc::clone(&self.scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn bootstrap_admin_only_creates_once() {
        let services = AppServices::from_storage(&Storage::in_memory(), Clock::Fixed(fixed_now()));
        let admin = AdminBootstrap {
            username: "root".into(),
            password: "pw".into(),
        };
        assert!(services.bootstrap_admin(&admin).await.unwrap());
        assert!(!services.bootstrap_admin(&admin).await.unwrap());
        assert!(services.accounts().verify_admin("root", "pw").await.is_ok());
        assert!(!format!("{admin:?}").contains("pw\""));
    }
}
