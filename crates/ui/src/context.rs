use std::sync::Arc;

use services::{
    AttemptRecorder, DashboardService, QuizCatalog, QuizRunner, SessionGatekeeper,
    SessionProvider,
};

pub trait UiApp: Send + Sync {
    fn catalog(&self) -> Arc<QuizCatalog>;
    fn sessions(&self) -> Arc<dyn SessionProvider>;
    fn gatekeeper(&self) -> Arc<SessionGatekeeper>;
    fn quiz_runner(&self) -> Arc<QuizRunner>;
    fn recorder(&self) -> Arc<AttemptRecorder>;
    fn dashboard(&self) -> Arc<DashboardService>;
}

#[derive(Clone)]
pub struct AppContext {
    catalog: Arc<QuizCatalog>,
    sessions: Arc<dyn SessionProvider>,
    gatekeeper: Arc<SessionGatekeeper>,
    quiz_runner: Arc<QuizRunner>,
    recorder: Arc<AttemptRecorder>,
    dashboard: Arc<DashboardService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            catalog: app.catalog(),
            sessions: app.sessions(),
            gatekeeper: app.gatekeeper(),
            quiz_runner: app.quiz_runner(),
            recorder: app.recorder(),
            dashboard: app.dashboard(),
        }
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

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
