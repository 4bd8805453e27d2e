//! Async controller that owns one quiz session.
//!
//! The runner serializes ticks and user commands through a single
//! `tokio::select!` loop, so the session never sees concurrent mutation. A
//! one-second interval drives the active question's countdown; the interval is
//! reset whenever the session issues a new timer token.

use std::sync::Arc;

use quiz_core::model::{OptionLetter, QuestionId, ScoreDraft};
use quiz_core::session::{AdvanceOutcome, QuizSession, SubmitOutcome, TickOutcome, TimerToken};
use quiz_core::time::TICK_INTERVAL;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, Interval, interval_at};
use tracing::debug;

use super::snapshot::QuizSnapshot;
use super::workflow::{QuizService, SubmissionStatus};

const COMMAND_BUFFER: usize = 32;

/// User input forwarded to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCommand {
    Select(QuestionId, OptionLetter),
    Next,
    Previous,
    GoTo(usize),
    Submit,
}

/// How the runner task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerExit {
    Submitted(SubmissionStatus),
    /// Every handle was dropped before submission.
    Abandoned,
}

/// Client side of a running quiz.
pub struct QuizHandle {
    commands: mpsc::Sender<QuizCommand>,
    snapshots: watch::Receiver<QuizSnapshot>,
    task: JoinHandle<RunnerExit>,
}

impl QuizHandle {
    /// Queue a command. Returns `false` once the quiz has finished.
    pub async fn send(&self, command: QuizCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    #[must_use]
    pub fn sender(&self) -> mpsc::Sender<QuizCommand> {
        self.commands.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QuizSnapshot> {
        self.snapshots.clone()
    }

    #[must_use]
    pub fn current(&self) -> QuizSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait for the runner to finish on its own (submission).
    ///
    /// # Errors
    ///
    /// Returns `JoinError` if the runner task panicked or was cancelled.
    pub async fn join(self) -> Result<RunnerExit, JoinError> {
        let Self { commands, task, .. } = self;
        let exit = task.await;
        drop(commands);
        exit
    }

    /// Close the command channel and wait for the runner to stop.
    ///
    /// The runner only stops once every cloned sender is gone as well.
    ///
    /// # Errors
    ///
    /// Returns `JoinError` if the runner task panicked or was cancelled.
    pub async fn abandon(self) -> Result<RunnerExit, JoinError> {
        let Self { commands, task, .. } = self;
        drop(commands);
        task.await
    }
}

/// Spawns runner tasks for started sessions.
#[derive(Clone)]
pub struct QuizRunner {
    service: Arc<QuizService>,
}

impl QuizRunner {
    #[must_use]
    pub fn new(service: Arc<QuizService>) -> Self {
        Self { service }
    }

    /// Take ownership of a started session and drive it on a tokio task.
    #[must_use]
    pub fn spawn(&self, session: QuizSession) -> QuizHandle {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshots_tx, snapshots) = watch::channel(QuizSnapshot::from_session(&session));
        let service = Arc::clone(&self.service);
        let task = tokio::spawn(run(session, service, rx, snapshots_tx));
        QuizHandle {
            commands,
            snapshots,
            task,
        }
    }
}

fn fresh_interval() -> Interval {
    interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL)
}

async fn run(
    mut session: QuizSession,
    service: Arc<QuizService>,
    mut commands: mpsc::Receiver<QuizCommand>,
    snapshots: watch::Sender<QuizSnapshot>,
) -> RunnerExit {
    let mut ticker = fresh_interval();
    let mut active: Option<TimerToken> = session.timer_token();
    let mut submitted: Option<ScoreDraft> = None;

    while submitted.is_none() {
        tokio::select! {
            _ = ticker.tick(), if active.is_some() => {
                let outcome = active.map_or(TickOutcome::Ignored, |token| session.tick(token));
                match outcome {
                    TickOutcome::Expired(AdvanceOutcome::Submitted(draft)) => {
                        debug!("all timers expired, auto-submitting");
                        submitted = Some(draft);
                    }
                    TickOutcome::Expired(AdvanceOutcome::Moved { index, .. }) => {
                        debug!(index, "timer expired, auto-advancing");
                    }
                    TickOutcome::Expired(AdvanceOutcome::Stayed) => {
                        debug!("timer expired, no open question to move to");
                    }
                    TickOutcome::Expired(AdvanceOutcome::Ignored)
                    | TickOutcome::Counting { .. }
                    | TickOutcome::Ignored => {}
                }
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    return RunnerExit::Abandoned;
                };
                if let Some(draft) = apply(&mut session, command) {
                    submitted = Some(draft);
                }
            }
        }

        if session.timer_token() != active {
            active = session.timer_token();
            ticker.reset();
        }
        snapshots.send_replace(QuizSnapshot::from_session(&session));
    }

    let status = match submitted {
        Some(draft) => service.record_submission(&draft).await,
        None => return RunnerExit::Abandoned,
    };
    snapshots.send_replace(QuizSnapshot::from_session(&session).with_saved(status.clone()));
    RunnerExit::Submitted(status)
}

fn apply(session: &mut QuizSession, command: QuizCommand) -> Option<ScoreDraft> {
    match command {
        QuizCommand::Select(question_id, letter) => {
            let outcome = session.select_answer(question_id, letter);
            debug!(%question_id, %letter, ?outcome, "answer selected");
            None
        }
        QuizCommand::Next => {
            session.go_next();
            None
        }
        QuizCommand::Previous => {
            session.go_previous();
            None
        }
        QuizCommand::GoTo(index) => {
            session.go_to(index);
            None
        }
        QuizCommand::Submit => match session.submit() {
            SubmitOutcome::Submitted(draft) => Some(draft),
            SubmitOutcome::AlreadySubmitted | SubmitOutcome::NotStarted => None,
        },
    }
}
