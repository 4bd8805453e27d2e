use quiz_core::model::{OptionLetter, Question, QuestionId, Response, ScoreId, UserId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn score_id_from_i64(v: i64) -> Result<ScoreId, StorageError> {
    Ok(ScoreId::new(i64_to_u64("score_id", v)?))
}

pub(crate) fn parse_letter(s: &str) -> Result<OptionLetter, StorageError> {
    s.parse::<OptionLetter>()
        .map_err(|_| StorageError::Serialization(format!("invalid answer letter: {s}")))
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let timer: Option<i64> = row.try_get("timer").map_err(ser)?;
    let time_limit = timer
        .map(|secs| {
            u32::try_from(secs)
                .map_err(|_| StorageError::Serialization(format!("invalid timer: {secs}")))
        })
        .transpose()?;

    let correct: String = row.try_get("correct_answer").map_err(ser)?;

    Ok(Question::from_persisted(
        question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("type").map_err(ser)?,
        row.try_get::<String, _>("question").map_err(ser)?,
        [
            row.try_get::<String, _>("option_a").map_err(ser)?,
            row.try_get::<String, _>("option_b").map_err(ser)?,
            row.try_get::<String, _>("option_c").map_err(ser)?,
            row.try_get::<String, _>("option_d").map_err(ser)?,
        ],
        parse_letter(&correct)?,
        time_limit,
    ))
}

pub(crate) fn map_response_row(row: &SqliteRow) -> Result<(ScoreId, Response), StorageError> {
    let selected: String = row.try_get("selected_answer").map_err(ser)?;
    let response = Response {
        question_id: question_id_from_i64(row.try_get::<i64, _>("question_id").map_err(ser)?)?,
        selected: parse_letter(&selected)?,
        is_correct: row.try_get::<i64, _>("is_correct").map_err(ser)? != 0,
    };
    Ok((
        score_id_from_i64(row.try_get::<i64, _>("score_id").map_err(ser)?)?,
        response,
    ))
}

/// Score header without responses.
pub(crate) struct ScoreHeader {
    pub id: ScoreId,
    pub user_id: UserId,
    pub score: u32,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

pub(crate) fn map_score_header(row: &SqliteRow) -> Result<ScoreHeader, StorageError> {
    let score: i64 = row.try_get("score").map_err(ser)?;
    Ok(ScoreHeader {
        id: score_id_from_i64(row.try_get::<i64, _>("score_id").map_err(ser)?)?,
        user_id: UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?).map_err(ser)?,
        score: u32::try_from(score)
            .map_err(|_| StorageError::Serialization(format!("invalid score: {score}")))?,
        submitted_at: row.try_get("score_date").map_err(ser)?,
    })
}
