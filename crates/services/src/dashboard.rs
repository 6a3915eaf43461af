use std::sync::Arc;

use chrono::{DateTime, Utc};

use quiz_core::model::{AttemptId, Subject, SubjectProgress, UserId, UserProfile};
use storage::repository::AttemptRepository;

use crate::auth::AuthUser;
use crate::catalog::QuizCatalog;
use crate::error::DashboardError;
use crate::profile::ProfileService;

/// Number of recent attempts shown by default.
pub const RECENT_ATTEMPTS_LIMIT: u32 = 5;

/// Progress card for one catalog subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCard {
    pub subject: Subject,
    pub title: String,
    /// `None` until the subject has been attempted.
    pub last: Option<SubjectProgress>,
}

impl SubjectCard {
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.last.as_ref().map_or(0, |p| p.progress.min(100))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptListItem {
    pub id: AttemptId,
    pub subject: Subject,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u8,
    pub duration_seconds: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub display_name: String,
    pub subjects: Vec<SubjectCard>,
    pub recent: Vec<AttemptListItem>,
}

/// Read model behind the landing page.
#[derive(Clone)]
pub struct DashboardService {
    catalog: Arc<QuizCatalog>,
    profiles: ProfileService,
    attempts: Arc<dyn AttemptRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        catalog: Arc<QuizCatalog>,
        profiles: ProfileService,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            catalog,
            profiles,
            attempts,
        }
    }

    /// Cards for every catalog subject plus the newest `limit` attempts.
    ///
    /// A user without a profile document gets empty cards.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError` on storage failures or an undecodable profile.
    pub async fn load(&self, user: &AuthUser, limit: u32) -> Result<Dashboard, DashboardError> {
        let profile = self.profiles.load(&user.uid).await?;
        let recent = self.recent(&user.uid, limit).await?;

        let display_name = profile
            .as_ref()
            .map(|p| p.name.trim())
            .filter(|name| !name.is_empty())
            .map_or_else(|| user.label().to_owned(), str::to_owned);

        Ok(Dashboard {
            display_name,
            subjects: self.cards(profile.as_ref()),
            recent,
        })
    }

    fn cards(&self, profile: Option<&UserProfile>) -> Vec<SubjectCard> {
        self.catalog
            .pages()
            .iter()
            .map(|page| SubjectCard {
                subject: page.subject().clone(),
                title: page.title().to_owned(),
                last: profile
                    .and_then(|p| p.progress_for(page.subject()))
                    .cloned(),
            })
            .collect()
    }

    async fn recent(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<AttemptListItem>, DashboardError> {
        let records = self.attempts.list_recent_attempts(user, limit).await?;
        Ok(records
            .into_iter()
            .map(|record| AttemptListItem {
                id: record.id,
                subject: record.attempt.subject().clone(),
                score: record.attempt.score(),
                max_score: record.attempt.max_score(),
                percentage: record.attempt.percentage(),
                duration_seconds: record.attempt.duration_seconds(),
                created_at: record.attempt.created_at(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::AttemptRecorder;
    use chrono::Duration;
    use quiz_core::model::{Attempt, QuestionId};
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::Storage;

    fn user() -> AuthUser {
        AuthUser {
            uid: UserId::new("ada@example.com").unwrap(),
            email: Some("ada@example.com".into()),
            display_name: None,
            photo_url: None,
        }
    }

    fn service(storage: &Storage) -> DashboardService {
        DashboardService::new(
            Arc::new(QuizCatalog::builtin()),
            ProfileService::new(storage.profiles.clone()),
            storage.attempts.clone(),
        )
    }

    #[tokio::test]
    async fn missing_profile_yields_empty_cards() {
        let storage = Storage::in_memory();
        let dashboard = service(&storage).load(&user(), 5).await.unwrap();

        assert_eq!(dashboard.display_name, "ada@example.com");
        assert_eq!(dashboard.subjects.len(), 3);
        assert!(dashboard.subjects.iter().all(|c| c.last.is_none() && c.progress() == 0));
        assert!(dashboard.recent.is_empty());
    }

    #[tokio::test]
    async fn shows_latest_progress_and_recent_attempts() {
        let storage = Storage::in_memory();
        let recorder = AttemptRecorder::new(
            fixed_clock(),
            storage.attempts.clone(),
            storage.profiles.clone(),
        );
        let uid = user().uid;
        for (minutes, subject, score) in [(0, "html", 1), (5, "css", 2), (10, "html", 2)] {
            let attempt = Attempt::new(
                Subject::new(subject).unwrap(),
                vec![QuestionId::new("a"), QuestionId::new("b")],
                vec![Some(0), Some(1)],
                score,
                20,
                fixed_now() + Duration::minutes(minutes),
            )
            .unwrap();
            recorder.record(&uid, &attempt).await.unwrap();
        }
        ProfileService::new(storage.profiles.clone())
            .ensure_profile(&user())
            .await
            .unwrap();

        let dashboard = service(&storage).load(&user(), 2).await.unwrap();

        let html = &dashboard.subjects[0];
        assert_eq!(html.title, "HTML Quiz");
        assert_eq!(html.progress(), 100);
        assert_eq!(dashboard.subjects[1].last.as_ref().unwrap().score, 2);
        assert!(dashboard.subjects[2].last.is_none());

        let recent: Vec<&str> = dashboard.recent.iter().map(|a| a.subject.as_str()).collect();
        assert_eq!(recent, vec!["html", "css"]);
        assert_eq!(dashboard.recent[0].percentage, 100);
    }
}
