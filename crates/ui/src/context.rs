use std::sync::Arc;

use quiz_core::model::UserId;
use services::{AccountService, QuestionService, QuizRunner, QuizService, ScoreService};

pub trait UiApp: Send + Sync {
    /// User id to prefill on the login form, if configured.
    fn prefill_user(&self) -> Option<UserId>;

    fn quiz(&self) -> Arc<QuizService>;
    fn runner(&self) -> Arc<QuizRunner>;
    fn questions(&self) -> Arc<QuestionService>;
    fn accounts(&self) -> Arc<AccountService>;
    fn scores(&self) -> Arc<ScoreService>;
}

#[derive(Clone)]
pub struct AppContext {
    prefill_user: Option<UserId>,

    quiz: Arc<QuizService>,
    runner: Arc<QuizRunner>,
    questions: Arc<QuestionService>,
    accounts: Arc<AccountService>,
    scores: Arc<ScoreService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            prefill_user: app.prefill_user(),
            quiz: app.quiz(),
            runner: app.runner(),
            questions: app.questions(),
            accounts: app.accounts(),
            scores: app.scores(),
        }
    }

    #[must_use]
    pub fn prefill_user(&self) -> Option<UserId> {
        self.prefill_user.clone()
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

/// Who is signed in. Quiz takers and admins authenticate separately.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<UserId>,
    pub admin: Option<String>,
}

/// Set while a started quiz attempt has not been submitted yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttemptGuard {
    pub in_progress: bool,
}

pub const LEAVE_ATTEMPT_PROMPT: &str =
    "Leave the quiz? Your unsubmitted answers will be lost and no score is saved.";

/// Ask before navigating away from an open attempt.
///
/// Resolves to `true` when the webview cannot show a dialog.
pub async fn confirm_leave_attempt() -> bool {
    let script = format!("return confirm({LEAVE_ATTEMPT_PROMPT:?});");
    dioxus::document::eval(&script)
        .join::<bool>()
        .await
        .unwrap_or(true)
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
