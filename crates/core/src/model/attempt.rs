use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::subject::Subject;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("answers ({answers}) do not line up with questions ({questions})")]
    LengthMismatch { questions: usize, answers: usize },

    #[error("score {score} exceeds max score {max_score}")]
    ScoreOutOfRange { score: u32, max_score: u32 },

    #[error("too many questions for a single attempt: {len}")]
    TooManyQuestions { len: usize },
}

/// Immutable record of one completed quiz run.
///
/// Serialized field names follow the persisted document layout
/// (`questionIds`, `maxScore`, `durationSeconds`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    subject: Subject,
    question_ids: Vec<QuestionId>,
    answers: Vec<Option<usize>>,
    score: u32,
    max_score: u32,
    duration_seconds: u64,
    created_at: DateTime<Utc>,
}

impl Attempt {
    /// Build an attempt, checking that answers align with questions.
    ///
    /// `max_score` is the number of questions asked.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` when the answer list length differs from the
    /// question list, or when `score` exceeds the question count.
    pub fn new(
        subject: Subject,
        question_ids: Vec<QuestionId>,
        answers: Vec<Option<usize>>,
        score: u32,
        duration_seconds: u64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if question_ids.len() != answers.len() {
            return Err(AttemptError::LengthMismatch {
                questions: question_ids.len(),
                answers: answers.len(),
            });
        }
        let max_score = u32::try_from(question_ids.len()).map_err(|_| {
            AttemptError::TooManyQuestions {
                len: question_ids.len(),
            }
        })?;
        if score > max_score {
            return Err(AttemptError::ScoreOutOfRange { score, max_score });
        }

        Ok(Self {
            subject,
            question_ids,
            answers,
            score,
            max_score,
            duration_seconds,
            created_at,
        })
    }

    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whole-number percentage, `round(score / max_score * 100)`; 0 for an empty attempt.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        percentage(self.score, self.max_score)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.question_ids.is_empty()
    }
}

/// `round(score / max_score * 100)`, clamped to 0..=100. An empty quiz is 0%.
#[must_use]
pub fn percentage(score: u32, max_score: u32) -> u8 {
    if max_score == 0 {
        return 0;
    }
    let pct = (f64::from(score) / f64::from(max_score) * 100.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = pct.clamp(0.0, 100.0) as u8;
    pct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn ids(n: usize) -> Vec<QuestionId> {
        (0..n).map(|i| QuestionId::new(format!("js-{i}"))).collect()
    }

    #[test]
    fn builds_with_max_score_from_question_count() {
        let attempt = Attempt::new(
            Subject::new("js").unwrap(),
            ids(3),
            vec![Some(0), None, Some(2)],
            2,
            42,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(attempt.max_score(), 3);
        assert_eq!(attempt.percentage(), 67);
    }

    #[test]
    fn rejects_mismatched_answers() {
        let err = Attempt::new(
            Subject::new("js").unwrap(),
            ids(2),
            vec![None],
            0,
            0,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AttemptError::LengthMismatch {
                questions: 2,
                answers: 1
            }
        );
    }

    #[test]
    fn rejects_score_above_max() {
        let err = Attempt::new(
            Subject::new("js").unwrap(),
            ids(1),
            vec![Some(0)],
            2,
            0,
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, AttemptError::ScoreOutOfRange { .. }));
    }

    #[test]
    fn percentage_rounds_and_handles_zero() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn serializes_with_document_field_names() {
        let attempt = Attempt::new(
            Subject::new("css").unwrap(),
            ids(1),
            vec![None],
            0,
            7,
            fixed_now(),
        )
        .unwrap();
        let value = serde_json::to_value(&attempt).unwrap();
        assert_eq!(value["subject"], "css");
        assert_eq!(value["maxScore"], 1);
        assert_eq!(value["durationSeconds"], 7);
        assert!(value["answers"][0].is_null());
        assert!(value.get("questionIds").is_some());
        assert!(value.get("createdAt").is_some());
    }
}
