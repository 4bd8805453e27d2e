mod ids;
mod question;
mod score;
mod user;

pub use ids::{ParseIdError, QuestionId, ScoreId};
pub use question::{
    DEFAULT_TIME_LIMIT_SECS, OptionLetter, Question, QuestionDraft, QuestionError,
    ValidatedQuestion,
};
pub use score::{Response, ScoreDraft, ScoreRecord};
pub use user::{UserId, UserIdError};
