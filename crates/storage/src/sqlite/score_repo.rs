use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quiz_core::model::{QuestionId, Response, ScoreDraft, ScoreId, ScoreRecord, UserId};
use sqlx::QueryBuilder;
use sqlx::sqlite::{Sqlite, SqliteRow};

use super::SqliteRepository;
use super::mapping::{
    ScoreHeader, conn, id_to_i64, map_response_row, map_score_header, score_id_from_i64, ser,
};
use crate::repository::{ScoreRepository, StorageError};

impl SqliteRepository {
    /// Attach responses to score headers with a single `IN (...)` query.
    async fn hydrate_scores(&self, rows: Vec<SqliteRow>) -> Result<Vec<ScoreRecord>, StorageError> {
        let mut headers = Vec::with_capacity(rows.len());
        for row in &rows {
            headers.push(map_score_header(row)?);
        }
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT score_id, position, question_id, selected_answer, is_correct \
             FROM score_responses WHERE score_id IN (",
        );
        let mut separated = qb.separated(", ");
        for header in &headers {
            separated.push_bind(id_to_i64("score_id", header.id.value())?);
        }
        separated.push_unseparated(") ORDER BY score_id ASC, position ASC");

        let response_rows = qb.build().fetch_all(&self.pool).await.map_err(conn)?;

        let mut grouped: HashMap<ScoreId, Vec<Response>> = HashMap::new();
        for row in &response_rows {
            let (score_id, response) = map_response_row(row)?;
            grouped.entry(score_id).or_default().push(response);
        }

        Ok(headers
            .into_iter()
            .map(|header| {
                let responses = grouped.remove(&header.id).unwrap_or_default();
                into_record(header, responses)
            })
            .collect())
    }
}

fn into_record(header: ScoreHeader, responses: Vec<Response>) -> ScoreRecord {
    ScoreRecord {
        id: header.id,
        user_id: header.user_id,
        score: header.score,
        responses,
        submitted_at: header.submitted_at,
    }
}

#[async_trait::async_trait]
impl ScoreRepository for SqliteRepository {
    async fn append_score(
        &self,
        draft: &ScoreDraft,
        submitted_at: DateTime<Utc>,
    ) -> Result<ScoreRecord, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
            INSERT INTO user_scores (user_id, score, score_date)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(draft.user_id.as_str())
        .bind(i64::from(draft.score))
        .bind(submitted_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;
        let score_id = score_id_from_i64(res.last_insert_rowid())?;

        for (position, response) in draft.responses.iter().enumerate() {
            let position = i64::try_from(position).map_err(ser)?;
            sqlx::query(
                r"
                INSERT INTO score_responses (score_id, position, question_id, selected_answer, is_correct)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(id_to_i64("score_id", score_id.value())?)
            .bind(position)
            .bind(id_to_i64("question_id", response.question_id.value())?)
            .bind(response.selected.as_str())
            .bind(i64::from(response.is_correct))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(draft.clone().assign(score_id, submitted_at))
    }

    async fn get_score(&self, id: ScoreId) -> Result<ScoreRecord, StorageError> {
        let row = sqlx::query(
            r"
            SELECT score_id, user_id, score, score_date
            FROM user_scores
            WHERE score_id = ?1
            ",
        )
        .bind(id_to_i64("score_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        self.hydrate_scores(vec![row])
            .await?
            .pop()
            .ok_or(StorageError::NotFound)
    }

    async fn list_scores_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT score_id, user_id, score, score_date
            FROM user_scores
            WHERE user_id = ?1
            ORDER BY score_date DESC, score_id DESC
            LIMIT ?2
            ",
        )
        .bind(user_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        self.hydrate_scores(rows).await
    }

    async fn list_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT score_id, user_id, score, score_date
            FROM user_scores
            ORDER BY score_date DESC, score_id DESC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        self.hydrate_scores(rows).await
    }

    async fn count_responses_for_question(&self, id: QuestionId) -> Result<u64, StorageError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM score_responses WHERE question_id = ?1")
                .bind(id_to_i64("question_id", id.value())?)
                .fetch_one(&self.pool)
                .await
                .map_err(conn)?;
        u64::try_from(count).map_err(ser)
    }
}
