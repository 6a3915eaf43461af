use async_trait::async_trait;
use quiz_core::model::{Attempt, AttemptId, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::document::{self, Document};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted attempt together with its owner and identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub id: AttemptId,
    pub user_id: UserId,
    pub attempt: Attempt,
}

/// Append-only store of raw attempts.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Persist a new attempt for `user` and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, user: &UserId, attempt: &Attempt)
    -> Result<AttemptId, StorageError>;

    /// Fetch a single attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_attempt(&self, id: AttemptId) -> Result<AttemptRecord, StorageError>;

    /// Newest-first attempts of a user, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_recent_attempts(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<AttemptRecord>, StorageError>;
}

/// Per-user profile documents.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch a user's document, `None` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn get_profile(&self, user: &UserId) -> Result<Option<Document>, StorageError>;

    /// Store `initial` only if the user has no document. Returns whether it was created.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn create_profile_if_missing(
        &self,
        user: &UserId,
        initial: Document,
    ) -> Result<bool, StorageError>;

    /// Deep-merge `patch` into the user's document, creating it when missing.
    ///
    /// Fields not named by `patch` are preserved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn merge_profile(&self, user: &UserId, patch: Document) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    attempts: Arc<Mutex<Vec<AttemptRecord>>>,
    profiles: Arc<Mutex<HashMap<UserId, Document>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempt(
        &self,
        user: &UserId,
        attempt: &Attempt,
    ) -> Result<AttemptId, StorageError> {
        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = AttemptId::generate();
        guard.push(AttemptRecord {
            id,
            user_id: user.clone(),
            attempt: attempt.clone(),
        });
        Ok(id)
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<AttemptRecord, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_recent_attempts(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<AttemptRecord>, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        // Reverse first so equal timestamps keep newest-inserted first under the stable sort.
        let mut found: Vec<AttemptRecord> = guard
            .iter()
            .rev()
            .filter(|record| &record.user_id == user)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.attempt.created_at().cmp(&a.attempt.created_at()));
        found.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(found)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self, user: &UserId) -> Result<Option<Document>, StorageError> {
        let guard = self
            .profiles
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user).cloned())
    }

    async fn create_profile_if_missing(
        &self,
        user: &UserId,
        initial: Document,
    ) -> Result<bool, StorageError> {
        let mut guard = self
            .profiles
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(user) {
            return Ok(false);
        }
        guard.insert(user.clone(), initial);
        Ok(true)
    }

    async fn merge_profile(&self, user: &UserId, patch: Document) -> Result<(), StorageError> {
        let mut guard = self
            .profiles
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let target = guard.entry(user.clone()).or_default();
        document::merge(target, patch);
        Ok(())
    }
}

/// Aggregates attempt and profile repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub attempts: Arc<dyn AttemptRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo);
        Self { attempts, profiles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{QuestionId, Subject};
    use quiz_core::time::fixed_now;
    use serde_json::json;

    fn build_attempt(subject: &str, score: u32, minutes_later: i64) -> Attempt {
        Attempt::new(
            Subject::new(subject).unwrap(),
            vec![QuestionId::new("q1"), QuestionId::new("q2")],
            vec![Some(0), None],
            score,
            30,
            fixed_now() + Duration::minutes(minutes_later),
        )
        .unwrap()
    }

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn appended_attempt_can_be_fetched() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1").unwrap();
        let attempt = build_attempt("html", 1, 0);

        let id = repo.append_attempt(&user, &attempt).await.unwrap();
        let record = repo.get_attempt(id).await.unwrap();

        assert_eq!(record.user_id, user);
        assert_eq!(record.attempt, attempt);
    }

    #[tokio::test]
    async fn recent_attempts_are_newest_first_and_scoped_to_user() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1").unwrap();
        let other = UserId::new("u2").unwrap();
        repo.append_attempt(&user, &build_attempt("html", 0, 0)).await.unwrap();
        repo.append_attempt(&user, &build_attempt("css", 1, 5)).await.unwrap();
        repo.append_attempt(&other, &build_attempt("js", 2, 10)).await.unwrap();

        let recent = repo.list_recent_attempts(&user, 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].attempt.subject().as_str(), "css");

        let limited = repo.list_recent_attempts(&user, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn missing_attempt_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.get_attempt(AttemptId::generate()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[test]
    fn storage_errors_name_their_cause() {
        assert_eq!(StorageError::NotFound.to_string(), "not found");
        assert_eq!(
            StorageError::Connection("locked".into()).to_string(),
            "connection error: locked"
        );
        assert_eq!(
            StorageError::Serialization("bad json".into()).to_string(),
            "serialization error: bad json"
        );
    }

    #[tokio::test]
    async fn create_if_missing_does_not_overwrite() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1").unwrap();
        assert!(
            repo.create_profile_if_missing(&user, doc(json!({"name": "Ada"})))
                .await
                .unwrap()
        );
        assert!(
            !repo
                .create_profile_if_missing(&user, doc(json!({"name": "Other"})))
                .await
                .unwrap()
        );
        let stored = repo.get_profile(&user).await.unwrap().unwrap();
        assert_eq!(stored["name"], "Ada");
    }

    #[tokio::test]
    async fn merge_creates_then_preserves_other_subjects() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1").unwrap();
        repo.merge_profile(
            &user,
            doc(json!({"quizProgress": {"html": {"score": 3}, "js": {"score": 2}}})),
        )
        .await
        .unwrap();
        repo.merge_profile(&user, doc(json!({"quizProgress": {"css": {"score": 1}}})))
            .await
            .unwrap();

        let stored = repo.get_profile(&user).await.unwrap().unwrap();
        assert_eq!(stored["quizProgress"]["html"]["score"], 3);
        assert_eq!(stored["quizProgress"]["js"]["score"], 2);
        assert_eq!(stored["quizProgress"]["css"]["score"], 1);
    }
}
