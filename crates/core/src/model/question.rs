use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Countdown used when a question carries no time limit.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 30;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyPrompt,

    #[error("option {0} cannot be empty")]
    EmptyOption(OptionLetter),

    #[error("correct answer must be one of A, B, C or D (got {0:?})")]
    InvalidCorrectAnswer(String),

    #[error("time limit must be greater than zero")]
    ZeroTimeLimit,
}

//
// ─── OPTION LETTER ─────────────────────────────────────────────────────────────
//

/// One of the four answer slots of a multiple-choice question.
///
/// Parsing is case-insensitive, so `"b"` and `"B"` name the same option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [Self::A, Self::B, Self::C, Self::D];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLetter {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            _ => Err(QuestionError::InvalidCorrectAnswer(s.to_string())),
        }
    }
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Raw admin input for a new question, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionDraft {
    pub kind: String,
    pub prompt: String,
    pub options: [String; 4],
    pub correct_answer: String,
    pub time_limit_secs: Option<u32>,
}

impl QuestionDraft {
    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt or an option is blank, the correct
    /// answer is not a letter A-D, or an explicit time limit is zero.
    pub fn validate(self) -> Result<ValidatedQuestion, QuestionError> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        let mut options: [String; 4] = Default::default();
        for (letter, raw) in OptionLetter::ALL.into_iter().zip(self.options) {
            let text = raw.trim().to_string();
            if text.is_empty() {
                return Err(QuestionError::EmptyOption(letter));
            }
            options[letter.index()] = text;
        }

        let correct_answer = self.correct_answer.parse::<OptionLetter>()?;

        let time_limit_secs = match self.time_limit_secs {
            Some(0) => return Err(QuestionError::ZeroTimeLimit),
            Some(secs) => secs,
            None => DEFAULT_TIME_LIMIT_SECS,
        };

        Ok(ValidatedQuestion {
            kind: self.kind.trim().to_string(),
            prompt,
            options,
            correct_answer,
            time_limit_secs,
        })
    }
}

/// A question that passed validation but has no store identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    pub kind: String,
    pub prompt: String,
    pub options: [String; 4],
    pub correct_answer: OptionLetter,
    pub time_limit_secs: u32,
}

impl ValidatedQuestion {
    #[must_use]
    pub fn assign_id(self, id: QuestionId) -> Question {
        Question {
            id,
            kind: self.kind,
            prompt: self.prompt,
            options: self.options,
            correct_answer: self.correct_answer,
            time_limit_secs: self.time_limit_secs,
        }
    }
}

/// A question of the bank. Immutable once fetched into a quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    kind: String,
    prompt: String,
    options: [String; 4],
    correct_answer: OptionLetter,
    time_limit_secs: u32,
}

impl Question {
    /// Rehydrate a question from storage.
    ///
    /// A missing or zero time limit falls back to `DEFAULT_TIME_LIMIT_SECS`,
    /// matching rows written before the limit was mandatory.
    #[must_use]
    pub fn from_persisted(
        id: QuestionId,
        kind: String,
        prompt: String,
        options: [String; 4],
        correct_answer: OptionLetter,
        time_limit_secs: Option<u32>,
    ) -> Self {
        Self {
            id,
            kind,
            prompt,
            options,
            correct_answer,
            time_limit_secs: time_limit_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIME_LIMIT_SECS),
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn option(&self, letter: OptionLetter) -> &str {
        &self.options[letter.index()]
    }

    #[must_use]
    pub fn options(&self) -> &[String; 4] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> OptionLetter {
        self.correct_answer
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn is_correct(&self, selected: OptionLetter) -> bool {
        self.correct_answer == selected
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
