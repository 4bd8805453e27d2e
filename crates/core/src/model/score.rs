use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{QuestionId, ScoreId};
use crate::model::question::OptionLetter;
use crate::model::user::UserId;

/// One answered question inside a submitted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub question_id: QuestionId,
    pub selected: OptionLetter,
    pub is_correct: bool,
}

/// A computed attempt waiting to be written to the score store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDraft {
    pub user_id: UserId,
    pub score: u32,
    pub responses: Vec<Response>,
}

impl ScoreDraft {
    #[must_use]
    pub fn assign(self, id: ScoreId, submitted_at: DateTime<Utc>) -> ScoreRecord {
        ScoreRecord {
            id,
            user_id: self.user_id,
            score: self.score,
            responses: self.responses,
            submitted_at,
        }
    }
}

/// A persisted attempt. Never mutated after it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: ScoreId,
    pub user_id: UserId,
    pub score: u32,
    pub responses: Vec<Response>,
    pub submitted_at: DateTime<Utc>,
}

impl ScoreRecord {
    /// Number of questions the user answered in this attempt.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.responses.len()
    }
}
