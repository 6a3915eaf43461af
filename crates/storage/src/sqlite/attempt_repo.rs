use quiz_core::model::{Attempt, AttemptId, UserId};

use super::{
    SqliteRepository,
    mapping::{conn, map_attempt_row, ser, u64_to_i64},
};
use crate::repository::{AttemptRecord, AttemptRepository, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn append_attempt(
        &self,
        user: &UserId,
        attempt: &Attempt,
    ) -> Result<AttemptId, StorageError> {
        let id = AttemptId::generate();
        let question_ids = serde_json::to_string(attempt.question_ids()).map_err(ser)?;
        let answers = serde_json::to_string(attempt.answers()).map_err(ser)?;

        sqlx::query(
            r"
                INSERT INTO attempts (
                    id, user_id, subject, question_ids, answers,
                    score, max_score, duration_seconds, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(id.to_string())
        .bind(user.as_str())
        .bind(attempt.subject().as_str())
        .bind(question_ids)
        .bind(answers)
        .bind(i64::from(attempt.score()))
        .bind(i64::from(attempt.max_score()))
        .bind(u64_to_i64("duration_seconds", attempt.duration_seconds())?)
        .bind(attempt.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(id)
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<AttemptRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    id, user_id, subject, question_ids, answers,
                    score, max_score, duration_seconds, created_at
                FROM attempts
                WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_attempt_row(&row)
    }

    async fn list_recent_attempts(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<AttemptRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, user_id, subject, question_ids, answers,
                    score, max_score, duration_seconds, created_at
                FROM attempts
                WHERE user_id = ?1
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?2
            ",
        )
        .bind(user.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_attempt_row(&row)?);
        }
        Ok(out)
    }
}
