use async_trait::async_trait;
use quiz_core::model::UserId;
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{conn, ser},
};
use crate::document::{self, Document};
use crate::repository::{ProfileRepository, StorageError};

fn encode(doc: &Document) -> Result<String, StorageError> {
    serde_json::to_string(doc).map_err(ser)
}

#[async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_profile(&self, user: &UserId) -> Result<Option<Document>, StorageError> {
        let row = sqlx::query("SELECT body FROM user_profiles WHERE user_id = ?1")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let body: String = row.try_get("body").map_err(ser)?;
        document::parse(&body)
            .map(Some)
            .map_err(StorageError::Serialization)
    }

    async fn create_profile_if_missing(
        &self,
        user: &UserId,
        initial: Document,
    ) -> Result<bool, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO user_profiles (user_id, body)
                VALUES (?1, ?2)
                ON CONFLICT(user_id) DO NOTHING
            ",
        )
        .bind(user.as_str())
        .bind(encode(&initial)?)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.rows_affected() == 1)
    }

    async fn merge_profile(&self, user: &UserId, patch: Document) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let row = sqlx::query("SELECT body FROM user_profiles WHERE user_id = ?1")
            .bind(user.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;

        let mut current = match row {
            Some(row) => {
                let body: String = row.try_get("body").map_err(ser)?;
                document::parse(&body).map_err(StorageError::Serialization)?
            }
            None => Document::new(),
        };
        document::merge(&mut current, patch);

        sqlx::query(
            r"
                INSERT INTO user_profiles (user_id, body)
                VALUES (?1, ?2)
                ON CONFLICT(user_id) DO UPDATE SET body = excluded.body
            ",
        )
        .bind(user.as_str())
        .bind(encode(&current)?)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
