use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const MAX_USER_ID_LEN: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserIdError {
    #[error("user id cannot be empty")]
    Empty,

    #[error("user id is too long ({len} > {MAX_USER_ID_LEN})")]
    TooLong { len: usize },
}

/// Login name of a quiz taker. Trimmed, never blank.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// # Errors
    ///
    /// Returns `UserIdError` if the trimmed value is empty or too long.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserIdError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_USER_ID_LEN {
            return Err(UserIdError::TooLong { len });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({:?})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
