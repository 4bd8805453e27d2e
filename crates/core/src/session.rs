//! Timed quiz session state machine.
//!
//! A session walks one user through an ordered copy of the question bank. Each
//! question owns an independent countdown, but only the active question's
//! countdown runs. The running countdown is identified by a [`TimerToken`];
//! every switch of the active question issues a new token, so ticks from a
//! previous question's timer are recognised and dropped.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::model::{OptionLetter, Question, QuestionId, ScoreDraft, UserId};
use crate::scoring::{ScoreOutcome, compute_score};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("a quiz needs at least one question")]
    Empty,

    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),
}

//
// ─── STATES & OUTCOMES ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Submitted,
}

/// Identity of the single running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    question_id: QuestionId,
    generation: u64,
}

impl TimerToken {
    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Status shown in the question grid.
///
/// An expired question that was never answered and a wrongly answered one look
/// different here (`Expired` vs `Answered`), while correctness is only revealed
/// through the response list after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Answered,
    Expired,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectRejection {
    NotInProgress,
    UnknownQuestion,
    TimeExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Recorded { previous: Option<OptionLetter> },
    Rejected(SelectRejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Another question became active and its countdown started.
    Moved { index: usize, token: TimerToken },
    /// No eligible question; the pointer did not move.
    Stayed,
    /// Every countdown reached zero and the session was submitted.
    Submitted(ScoreDraft),
    /// The session is not in progress.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale token, no running timer, or session not in progress.
    Ignored,
    Counting { remaining: u32 },
    Expired(AdvanceOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved { index: usize, token: TimerToken },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(ScoreDraft),
    AlreadySubmitted,
    NotStarted,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One user's attempt at the quiz, owned by a single controller.
#[derive(Debug, Clone)]
pub struct QuizSession {
    user_id: UserId,
    questions: Vec<Question>,
    answers: HashMap<QuestionId, OptionLetter>,
    remaining: HashMap<QuestionId, u32>,
    current: usize,
    state: SessionState,
    running: Option<TimerToken>,
    generation: u64,
    outcome: Option<ScoreOutcome>,
}

impl QuizSession {
    /// Create a session over a copy of the question list.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Empty` for an empty list and
    /// `QuizSessionError::DuplicateQuestion` if two questions share an id.
    pub fn new(user_id: UserId, questions: Vec<Question>) -> Result<Self, QuizSessionError> {
        if questions.is_empty() {
            return Err(QuizSessionError::Empty);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(QuizSessionError::DuplicateQuestion(question.id()));
            }
        }

        let remaining = questions
            .iter()
            .map(|q| (q.id(), q.time_limit_secs()))
            .collect();

        Ok(Self {
            user_id,
            questions,
            answers: HashMap::new(),
            remaining,
            current: 0,
            state: SessionState::NotStarted,
            running: None,
            generation: 0,
            outcome: None,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.state == SessionState::Submitted
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn remaining_secs(&self, question_id: QuestionId) -> Option<u32> {
        self.remaining.get(&question_id).copied()
    }

    #[must_use]
    pub fn current_remaining_secs(&self) -> u32 {
        self.remaining_secs(self.current_question().id())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn answer(&self, question_id: QuestionId) -> Option<OptionLetter> {
        self.answers.get(&question_id).copied()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn status(&self, question_id: QuestionId) -> QuestionStatus {
        if self.answers.contains_key(&question_id) {
            QuestionStatus::Answered
        } else if self.remaining_secs(question_id) == Some(0) {
            QuestionStatus::Expired
        } else {
            QuestionStatus::Pending
        }
    }

    #[must_use]
    pub fn statuses(&self) -> Vec<QuestionStatus> {
        self.questions.iter().map(|q| self.status(q.id())).collect()
    }

    /// The countdown currently running, if any.
    #[must_use]
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.running
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.state == SessionState::InProgress && self.current + 1 < self.questions.len()
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.state == SessionState::InProgress && self.current > 0
    }

    /// Score and responses, available once submitted.
    #[must_use]
    pub fn outcome(&self) -> Option<&ScoreOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn final_score(&self) -> Option<u32> {
        self.outcome.as_ref().map(|o| o.score)
    }

    /// Begin the quiz and start the first question's countdown.
    ///
    /// Returns `None` if the session was already started.
    pub fn start(&mut self) -> Option<TimerToken> {
        if self.state != SessionState::NotStarted {
            return None;
        }
        self.state = SessionState::InProgress;
        Some(self.activate(0))
    }

    /// Record or overwrite the chosen letter for any question that still has time.
    pub fn select_answer(&mut self, question_id: QuestionId, letter: OptionLetter) -> SelectOutcome {
        if self.state != SessionState::InProgress {
            return SelectOutcome::Rejected(SelectRejection::NotInProgress);
        }
        match self.remaining_secs(question_id) {
            None => SelectOutcome::Rejected(SelectRejection::UnknownQuestion),
            Some(0) => SelectOutcome::Rejected(SelectRejection::TimeExpired),
            Some(_) => SelectOutcome::Recorded {
                previous: self.answers.insert(question_id, letter),
            },
        }
    }

    /// One second elapsed on the timer identified by `token`.
    pub fn tick(&mut self, token: TimerToken) -> TickOutcome {
        if self.state != SessionState::InProgress || self.running != Some(token) {
            return TickOutcome::Ignored;
        }

        let Some(slot) = self.remaining.get_mut(&token.question_id) else {
            return TickOutcome::Ignored;
        };
        *slot = slot.saturating_sub(1);
        let remaining = *slot;

        if remaining > 0 {
            return TickOutcome::Counting { remaining };
        }

        self.running = None;
        TickOutcome::Expired(self.advance())
    }

    /// Pick the next question after a timeout.
    ///
    /// Order: the nearest later question that is unanswered with time left,
    /// then the first such question from the top, then submission once every
    /// countdown has reached zero.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.state != SessionState::InProgress {
            return AdvanceOutcome::Ignored;
        }

        let forward = (self.current + 1..self.questions.len()).find(|&idx| self.is_open(idx));
        let candidate = forward.or_else(|| (0..self.questions.len()).find(|&idx| self.is_open(idx)));

        if let Some(index) = candidate {
            if index == self.current {
                return AdvanceOutcome::Stayed;
            }
            let token = self.activate(index);
            return AdvanceOutcome::Moved { index, token };
        }

        if self.remaining.values().all(|secs| *secs == 0) {
            return match self.submit() {
                SubmitOutcome::Submitted(draft) => AdvanceOutcome::Submitted(draft),
                SubmitOutcome::AlreadySubmitted | SubmitOutcome::NotStarted => {
                    AdvanceOutcome::Ignored
                }
            };
        }

        AdvanceOutcome::Stayed
    }

    pub fn go_next(&mut self) -> NavOutcome {
        if !self.can_go_next() {
            return NavOutcome::Unchanged;
        }
        self.go_to(self.current + 1)
    }

    pub fn go_previous(&mut self) -> NavOutcome {
        if !self.can_go_previous() {
            return NavOutcome::Unchanged;
        }
        self.go_to(self.current - 1)
    }

    /// Jump to a question. The outgoing countdown is paused, not reset.
    pub fn go_to(&mut self, index: usize) -> NavOutcome {
        if self.state != SessionState::InProgress
            || index >= self.questions.len()
            || index == self.current
        {
            return NavOutcome::Unchanged;
        }
        let token = self.activate(index);
        NavOutcome::Moved { index, token }
    }

    /// Finalise the attempt. Idempotent.
    pub fn submit(&mut self) -> SubmitOutcome {
        match self.state {
            SessionState::NotStarted => return SubmitOutcome::NotStarted,
            SessionState::Submitted => return SubmitOutcome::AlreadySubmitted,
            SessionState::InProgress => {}
        }

        self.running = None;
        let outcome = compute_score(&self.questions, &self.answers);
        let draft = ScoreDraft {
            user_id: self.user_id.clone(),
            score: outcome.score,
            responses: outcome.responses.clone(),
        };
        self.outcome = Some(outcome);
        self.state = SessionState::Submitted;
        SubmitOutcome::Submitted(draft)
    }

    fn is_open(&self, index: usize) -> bool {
        let id = self.questions[index].id();
        !self.answers.contains_key(&id) && self.remaining_secs(id).is_some_and(|secs| secs > 0)
    }

    fn activate(&mut self, index: usize) -> TimerToken {
        self.current = index;
        self.generation += 1;
        let token = TimerToken {
            question_id: self.questions[index].id(),
            generation: self.generation,
        };
        self.running = Some(token);
        token
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
