use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::attempt::Attempt;
use crate::model::subject::Subject;

/// Display name used when the session provider has none.
pub const DEFAULT_PROFILE_NAME: &str = "New User";

/// Latest-attempt aggregate for one subject, stored under `quizProgress.{subject}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectProgress {
    pub score: u32,
    pub max_score: u32,
    pub last_attempt_date: Option<DateTime<Utc>>,
    /// Whole-number percentage in 0..=100.
    pub progress: u8,
}

impl SubjectProgress {
    /// Aggregate for the given attempt; only the latest attempt is kept.
    #[must_use]
    pub fn from_attempt(attempt: &Attempt) -> Self {
        Self {
            score: attempt.score(),
            max_score: attempt.max_score(),
            last_attempt_date: Some(attempt.created_at()),
            progress: attempt.percentage(),
        }
    }
}

/// Typed view of a user's profile document.
///
/// Unknown top-level fields are carried in `extra` so that reading and
/// re-serializing a profile never drops data written by someone else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub quiz_progress: BTreeMap<String, SubjectProgress>,
    #[serde(default)]
    pub scores: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl UserProfile {
    /// Fresh profile with empty progress.
    #[must_use]
    pub fn new(name: Option<&str>, email: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_PROFILE_NAME);
        Self {
            name: name.to_owned(),
            email: email.map(str::to_owned),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn progress_for(&self, subject: &Subject) -> Option<&SubjectProgress> {
        self.quiz_progress.get(subject.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::QuestionId;
    use crate::time::fixed_now;

    #[test]
    fn progress_from_attempt_uses_percentage() {
        let attempt = Attempt::new(
            Subject::new("html").unwrap(),
            vec![QuestionId::new("a"), QuestionId::new("b")],
            vec![Some(1), None],
            1,
            12,
            fixed_now(),
        )
        .unwrap();
        let progress = SubjectProgress::from_attempt(&attempt);
        assert_eq!(progress.score, 1);
        assert_eq!(progress.max_score, 2);
        assert_eq!(progress.progress, 50);
        assert_eq!(progress.last_attempt_date, Some(fixed_now()));
    }

    #[test]
    fn new_profile_defaults_name() {
        let profile = UserProfile::new(Some("  "), Some("a@b.c"));
        assert_eq!(profile.name, DEFAULT_PROFILE_NAME);
        assert_eq!(profile.email.as_deref(), Some("a@b.c"));
        assert!(profile.quiz_progress.is_empty());
    }

    #[test]
    fn unknown_fields_survive_a_roundtrip() {
        let json = serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "quizProgress": {
                "html": {"score": 3, "lastAttemptDate": "2023-11-14T22:13:20Z", "progress": 60}
            },
            "theme": "dark"
        });
        let profile: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.extra.get("theme"), Some(&Value::from("dark")));
        let html = profile.progress_for(&Subject::new("html").unwrap()).unwrap();
        assert_eq!(html.score, 3);
        assert_eq!(html.max_score, 0);

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["theme"], "dark");
        assert_eq!(back["quizProgress"]["html"]["progress"], 60);
    }
}
