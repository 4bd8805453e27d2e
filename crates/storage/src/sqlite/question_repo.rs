use quiz_core::model::{Question, QuestionId, ValidatedQuestion};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_question_row, question_id_from_i64};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, type, question, option_a, option_b, option_c, option_d, correct_answer, timer
            FROM quiz_questions
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        Ok(questions)
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, type, question, option_a, option_b, option_c, option_d, correct_answer, timer
            FROM quiz_questions
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("question_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_question_row).transpose()
    }

    async fn insert_question(
        &self,
        question: &ValidatedQuestion,
    ) -> Result<QuestionId, StorageError> {
        let [a, b, c, d] = &question.options;
        let res = sqlx::query(
            r"
            INSERT INTO quiz_questions (type, question, option_a, option_b, option_c, option_d, correct_answer, timer)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(&question.kind)
        .bind(&question.prompt)
        .bind(a)
        .bind(b)
        .bind(c)
        .bind(d)
        .bind(question.correct_answer.as_str())
        .bind(i64::from(question.time_limit_secs))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        question_id_from_i64(res.last_insert_rowid())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM quiz_questions WHERE id = ?1")
            .bind(id_to_i64("question_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
