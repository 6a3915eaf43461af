use quiz_core::model::{Attempt, AttemptId, QuestionId, Subject, UserId};
use sqlx::Row;

use crate::repository::{AttemptRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<AttemptRecord, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let id: AttemptId = id.parse().map_err(ser)?;
    let user_id = UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?).map_err(ser)?;
    let subject = Subject::new(row.try_get::<String, _>("subject").map_err(ser)?).map_err(ser)?;

    let question_ids: Vec<QuestionId> =
        serde_json::from_str(&row.try_get::<String, _>("question_ids").map_err(ser)?)
            .map_err(ser)?;
    let answers: Vec<Option<usize>> =
        serde_json::from_str(&row.try_get::<String, _>("answers").map_err(ser)?).map_err(ser)?;

    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let max_score = u32_from_i64("max_score", row.try_get::<i64, _>("max_score").map_err(ser)?)?;
    let duration: i64 = row.try_get("duration_seconds").map_err(ser)?;
    let duration = u64::try_from(duration)
        .map_err(|_| StorageError::Serialization(format!("invalid duration_seconds: {duration}")))?;

    let attempt = Attempt::new(
        subject,
        question_ids,
        answers,
        score,
        duration,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)?;

    if attempt.max_score() != max_score {
        return Err(StorageError::Serialization(format!(
            "max_score {max_score} does not match {} stored questions",
            attempt.max_score()
        )));
    }

    Ok(AttemptRecord {
        id,
        user_id,
        attempt,
    })
}
