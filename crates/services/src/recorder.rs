use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use quiz_core::model::{Attempt, AttemptId, SubjectProgress, UserId};
use storage::repository::{AttemptRepository, ProfileRepository};

use crate::Clock;
use crate::auth::AuthUser;
use crate::error::RecorderError;
use crate::profile::to_document;
use crate::quiz::FinishedQuiz;

/// Why an attempt was not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SignedOut,
    NothingAsked,
}

/// Result of handing a finished quiz to the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(AttemptId),
    Skipped(SkipReason),
    Failed(String),
}

impl SaveOutcome {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressPatch<'a> {
    quiz_progress: BTreeMap<&'a str, SubjectProgress>,
    updated_at: DateTime<Utc>,
}

/// Persists attempts and folds them into the user's progress aggregate.
#[derive(Clone)]
pub struct AttemptRecorder {
    clock: Clock,
    attempts: Arc<dyn AttemptRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AttemptRecorder {
    #[must_use]
    pub fn new(
        clock: Clock,
        attempts: Arc<dyn AttemptRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            clock,
            attempts,
            profiles,
        }
    }

    /// Store `attempt`, then merge the subject's latest progress into the
    /// profile document. Other subjects and fields are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `RecorderError` if either write fails. The raw attempt may
    /// already be stored when the profile merge fails.
    pub async fn record(
        &self,
        user: &UserId,
        attempt: &Attempt,
    ) -> Result<AttemptId, RecorderError> {
        let id = self.attempts.append_attempt(user, attempt).await?;

        let progress = SubjectProgress::from_attempt(attempt);
        let patch = ProgressPatch {
            quiz_progress: BTreeMap::from([(attempt.subject().as_str(), progress)]),
            updated_at: self.clock.now(),
        };
        self.profiles.merge_profile(user, to_document(&patch)?).await?;

        info!(
            user = %user,
            subject = %attempt.subject(),
            attempt_id = %id,
            score = attempt.score(),
            max_score = attempt.max_score(),
            "recorded attempt"
        );
        Ok(id)
    }

    /// Record `attempt` for the signed-in user. Never fails: a missing
    /// session or a storage error is reported in the outcome.
    pub async fn submit(&self, session: Option<&AuthUser>, attempt: &Attempt) -> SaveOutcome {
        let Some(user) = session else {
            warn!(subject = %attempt.subject(), "no session, attempt not saved");
            return SaveOutcome::Skipped(SkipReason::SignedOut);
        };
        match self.record(&user.uid, attempt).await {
            Ok(id) => SaveOutcome::Saved(id),
            Err(err) => {
                error!(
                    user = %user.uid,
                    subject = %attempt.subject(),
                    error = %err,
                    "failed to save attempt"
                );
                SaveOutcome::Failed(err.to_string())
            }
        }
    }

    /// Snapshot and submit a finished quiz. Runs where nothing was asked are skipped.
    pub async fn submit_finished(
        &self,
        session: Option<&AuthUser>,
        finished: &FinishedQuiz,
    ) -> SaveOutcome {
        if !finished.is_recordable() {
            return SaveOutcome::Skipped(SkipReason::NothingAsked);
        }
        match finished.attempt() {
            Ok(attempt) => self.submit(session, &attempt).await,
            Err(err) => {
                error!(subject = %finished.subject(), error = %err, "inconsistent quiz result");
                SaveOutcome::Failed(RecorderError::from(err).to_string())
            }
        }
    }
}
