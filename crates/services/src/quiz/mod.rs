mod runner;
mod snapshot;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use runner::{QuizCommand, QuizHandle, QuizRunner, RunnerExit};
pub use snapshot::{QuestionView, QuizResult, QuizSnapshot};
pub use workflow::{QuizService, SubmissionStatus};
