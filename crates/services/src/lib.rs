#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod error;
pub mod password;
pub mod question_service;
pub mod quiz;
pub mod score_service;

pub use quiz_core::Clock;

pub use account_service::{AccountService, PasswordSet};
pub use app_services::{AdminBootstrap, AppServices};
pub use error::{AccountError, AppServicesError, QuestionServiceError, QuizError, ScoreServiceError};
pub use question_service::{DeleteOutcome, QuestionService};
pub use quiz::{
    QuestionView, QuizCommand, QuizHandle, QuizResult, QuizRunner, QuizService, QuizSnapshot,
    RunnerExit, SubmissionStatus,
};
pub use score_service::ScoreService;
