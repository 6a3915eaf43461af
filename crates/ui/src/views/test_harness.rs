use std::rc::Rc;
use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_history::{History, MemoryHistory, provide_history_context};
use dioxus_router::Router;
use quiz_core::time::fixed_clock;
use services::{
    AppServices, AttemptRecorder, DashboardService, LocalSessionProvider, QuizCatalog,
    QuizRunner, SessionGatekeeper, SessionProvider,
};

use crate::context::{UiApp, build_app_context};
use crate::routes::Route;

struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn catalog(&self) -> Arc<QuizCatalog> {
        self.services.catalog()
    }

    fn sessions(&self) -> Arc<dyn SessionProvider> {
        self.services.sessions()
    }

    fn gatekeeper(&self) -> Arc<SessionGatekeeper> {
        self.services.gatekeeper()
    }

    fn quiz_runner(&self) -> Arc<QuizRunner> {
        self.services.quiz_runner()
    }

    fn recorder(&self) -> Arc<AttemptRecorder> {
        self.services.recorder()
    }

    fn dashboard(&self) -> Arc<DashboardService> {
        self.services.dashboard()
    }
}

#[derive(Props, Clone)]
struct HarnessProps {
    app: Arc<dyn UiApp>,
    history: Rc<dyn History>,
}

impl PartialEq for HarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn RouterHarness(props: HarnessProps) -> Element {
    use_hook(|| provide_history_context(Rc::clone(&props.history)));
    use_context_provider(|| build_app_context(&props.app));
    rsx! { Router::<Route> {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub history: Rc<MemoryHistory>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    pub fn current_path(&self) -> String {
        self.history.current_route()
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Harness over the real router, starting at `path` with in-memory services.
pub fn setup_view_harness(signed_in_as: Option<&str>, path: &str) -> ViewHarness {
    let sessions: Arc<dyn SessionProvider> = match signed_in_as {
        Some(email) => {
            Arc::new(LocalSessionProvider::signed_in_as(email).expect("valid email"))
        }
        None => Arc::new(LocalSessionProvider::new()),
    };
    let services = AppServices::in_memory(sessions, QuizCatalog::builtin(), fixed_clock());
    let app: Arc<dyn UiApp> = Arc::new(TestApp { services });
    let history = Rc::new(MemoryHistory::with_initial_path(path));
    let dom = VirtualDom::new_with_props(
        RouterHarness,
        HarnessProps {
            app,
            history: history.clone(),
        },
    );
    ViewHarness { dom, history }
}
