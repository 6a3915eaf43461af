use std::sync::Arc;

use tracing::{debug, info, warn};

use quiz_core::access::{self, GateDecision, PageLocation};

use crate::auth::{Session, SessionProvider};
use crate::profile::ProfileService;

/// Watches the session and applies the redirect policy on every change.
#[derive(Clone)]
pub struct SessionGatekeeper {
    sessions: Arc<dyn SessionProvider>,
    profiles: ProfileService,
}

impl SessionGatekeeper {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionProvider>, profiles: ProfileService) -> Self {
        Self { sessions, profiles }
    }

    #[must_use]
    pub fn current_user(&self) -> Session {
        self.sessions.current_user()
    }

    /// Decision for `page` under the current session.
    #[must_use]
    pub fn decide(&self, page: &PageLocation) -> GateDecision {
        access::decide(self.sessions.current_user().is_some(), page)
    }

    /// Bootstrap the profile of a newly observed user. Failures are logged only.
    pub async fn on_session_change(&self, session: &Session) {
        let Some(user) = session else {
            debug!("session cleared");
            return;
        };
        info!(user = %user.uid, "session observed");
        if let Err(err) = self.profiles.ensure_profile(user).await {
            warn!(user = %user.uid, error = %err, "could not ensure profile document");
        }
    }

    /// Evaluate the current session, then every later change, until the
    /// provider goes away. `on_session` receives each session and reports the
    /// page being shown; `navigate` receives each redirect target.
    pub async fn observe<S, N>(&self, mut on_session: S, mut navigate: N)
    where
        S: FnMut(&Session) -> PageLocation,
        N: FnMut(String),
    {
        let mut changes = self.sessions.subscribe();
        loop {
            let session = changes.borrow_and_update().clone();
            let page = on_session(&session);
            self.on_session_change(&session).await;

            let decision = access::decide(session.is_some(), &page);
            if let Some(target) = decision.target() {
                info!(from = %page.path(), to = %target, "redirecting");
                navigate(target);
            }

            if changes.changed().await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalSessionProvider;
    use std::sync::Mutex;
    use storage::repository::Storage;

    fn gatekeeper(provider: &LocalSessionProvider, storage: &Storage) -> SessionGatekeeper {
        SessionGatekeeper::new(
            Arc::new(provider.clone()),
            ProfileService::new(storage.profiles.clone()),
        )
    }

    #[tokio::test]
    async fn decide_uses_current_session() {
        let provider = LocalSessionProvider::new();
        let gate = gatekeeper(&provider, &Storage::in_memory());
        let page = PageLocation::parse("/quiz/html");

        assert_eq!(
            gate.decide(&page).target().as_deref(),
            Some("/login?redirect=%2Fquiz%2Fhtml")
        );
        provider.sign_in("ada@example.com", "pw").await.unwrap();
        assert_eq!(gate.decide(&page), GateDecision::Proceed);
    }

    #[tokio::test]
    async fn observed_session_bootstraps_profile() {
        let provider = LocalSessionProvider::new();
        let storage = Storage::in_memory();
        let gate = gatekeeper(&provider, &storage);

        let user = provider.sign_up("ada@example.com", "pw", Some("Ada")).await.unwrap();
        gate.on_session_change(&Some(user.clone())).await;

        let doc = storage.profiles.get_profile(&user.uid).await.unwrap().unwrap();
        assert_eq!(doc["name"], "Ada");
        assert_eq!(doc["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn observe_redirects_on_each_change() {
        let provider = LocalSessionProvider::new();
        let gate = gatekeeper(&provider, &Storage::in_memory());
        let current = Arc::new(Mutex::new(PageLocation::parse("/quiz/css?count=5")));
        let visited = Arc::new(Mutex::new(Vec::<String>::new()));

        let task = {
            let gate = gate.clone();
            let current = Arc::clone(&current);
            let visited = Arc::clone(&visited);
            tokio::spawn(async move {
                gate.observe(
                    move |_: &Session| current.lock().unwrap().clone(),
                    move |target| {
                        visited.lock().unwrap().push(target);
                    },
                )
                .await;
            })
        };

        tokio::task::yield_now().await;
        for _ in 0..50 {
            if !visited.lock().unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        *current.lock().unwrap() = PageLocation::parse("/login?redirect=%2Fquiz%2Fcss%3Fcount%3D5");
        provider.sign_in("ada@example.com", "pw").await.unwrap();

        for _ in 0..50 {
            if visited.lock().unwrap().len() >= 2 {
                break;
            }
            tokio::task::yield_now().await;
        }
        task.abort();

        let visited = visited.lock().unwrap().clone();
        assert_eq!(
            visited,
            vec![
                "/login?redirect=%2Fquiz%2Fcss%3Fcount%3D5".to_owned(),
                "/quiz/css?count=5".to_owned(),
            ]
        );
    }
}
