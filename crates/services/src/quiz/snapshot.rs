use quiz_core::model::{OptionLetter, Question, QuestionId, Response};
use quiz_core::session::{QuestionStatus, QuizSession, SessionState};

use super::workflow::SubmissionStatus;

/// Display data for the active question. The correct answer is not exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub id: QuestionId,
    pub kind: String,
    pub prompt: String,
    pub options: [String; 4],
}

impl QuestionView {
    fn from_question(question: &Question) -> Self {
        Self {
            id: question.id(),
            kind: question.kind().to_string(),
            prompt: question.prompt().to_string(),
            options: question.options().clone(),
        }
    }

    #[must_use]
    pub fn option(&self, letter: OptionLetter) -> &str {
        &self.options[letter.index()]
    }
}

/// Final result shown once the session is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub score: u32,
    pub total: usize,
    pub responses: Vec<Response>,
    /// `None` while the score is still being written.
    pub saved: Option<SubmissionStatus>,
}

/// Read-only picture of a running quiz, published after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSnapshot {
    pub state: SessionState,
    pub index: usize,
    pub total: usize,
    pub question: QuestionView,
    pub remaining_secs: u32,
    pub selected: Option<OptionLetter>,
    pub statuses: Vec<QuestionStatus>,
    pub answered: usize,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub result: Option<QuizResult>,
}

impl QuizSnapshot {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        let question = session.current_question();
        let result = session.outcome().map(|outcome| QuizResult {
            score: outcome.score,
            total: session.total(),
            responses: outcome.responses.clone(),
            saved: None,
        });

        Self {
            state: session.state(),
            index: session.current_index(),
            total: session.total(),
            question: QuestionView::from_question(question),
            remaining_secs: session.current_remaining_secs(),
            selected: session.answer(question.id()),
            statuses: session.statuses(),
            answered: session.answered_count(),
            can_go_next: session.can_go_next(),
            can_go_previous: session.can_go_previous(),
            result,
        }
    }

    #[must_use]
    pub fn with_saved(mut self, status: SubmissionStatus) -> Self {
        if let Some(result) = self.result.as_mut() {
            result.saved = Some(status);
        }
        self
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.state == SessionState::Submitted
    }

    /// 1-based position label, e.g. `3 / 10`.
    #[must_use]
    pub fn position_label(&self) -> String {
        format!("{} / {}", self.index + 1, self.total)
    }
}
