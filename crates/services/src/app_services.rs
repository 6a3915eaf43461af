use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::auth::SessionProvider;
use crate::bank::QuestionBankLoader;
use crate::catalog::QuizCatalog;
use crate::dashboard::DashboardService;
use crate::error::AppServicesError;
use crate::gatekeeper::SessionGatekeeper;
use crate::profile::ProfileService;
use crate::quiz::QuizRunner;
use crate::recorder::AttemptRecorder;

/// Assembles app-facing services over one storage backend and session provider.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<QuizCatalog>,
    sessions: Arc<dyn SessionProvider>,
    gatekeeper: Arc<SessionGatekeeper>,
    quiz_runner: Arc<QuizRunner>,
    recorder: Arc<AttemptRecorder>,
    dashboard: Arc<DashboardService>,
}

impl AppServices {
    #[must_use]
    pub fn new(
        storage: &Storage,
        sessions: Arc<dyn SessionProvider>,
        catalog: QuizCatalog,
        loader: QuestionBankLoader,
        clock: Clock,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let profiles = ProfileService::new(Arc::clone(&storage.profiles));
        let gatekeeper = Arc::new(SessionGatekeeper::new(
            Arc::clone(&sessions),
            profiles.clone(),
        ));
        let quiz_runner = Arc::new(QuizRunner::new(clock, loader, Arc::clone(&catalog)));
        let recorder = Arc::new(AttemptRecorder::new(
            clock,
            Arc::clone(&storage.attempts),
            Arc::clone(&storage.profiles),
        ));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&catalog),
            profiles,
            Arc::clone(&storage.attempts),
        ));

        Self {
            catalog,
            sessions,
            gatekeeper,
            quiz_runner,
            recorder,
            dashboard,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        sessions: Arc<dyn SessionProvider>,
        catalog: QuizCatalog,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(
            &storage,
            sessions,
            catalog,
            QuestionBankLoader::new(),
            clock,
        ))
    }

    /// Services over in-memory storage, for tests and previews.
    #[must_use]
    pub fn in_memory(
        sessions: Arc<dyn SessionProvider>,
        catalog: QuizCatalog,
        clock: Clock,
    ) -> Self {
        Self::new(
            &Storage::in_memory(),
            sessions,
            catalog,
            QuestionBankLoader::new(),
            clock,
        )
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<QuizCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<dyn SessionProvider> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn gatekeeper(&self) -> Arc<SessionGatekeeper> {
        Arc::clone(&self.gatekeeper)
    }

    #[must_use]
    pub fn quiz_runner(&self) -> Arc<QuizRunner> {
        Arc::clone(&self.quiz_runner)
    }

    #[must_use]
    pub fn recorder(&self) -> Arc<AttemptRecorder> {
        Arc::clone(&self.recorder)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }
}
