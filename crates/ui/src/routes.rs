use dioxus::prelude::*;
use dioxus_router::{Link, Navigator, Outlet, Routable, use_navigator, use_route};
use tracing::{info, warn};

use quiz_core::access::PageLocation;
use services::Session;

use crate::context::AppContext;
use crate::views::{DashboardView, LoginView, QuizView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", DashboardView)] Dashboard {},
        #[route("/login?:redirect", LoginView)] Login { redirect: String },
        #[route("/quiz/:subject", QuizView)] Quiz { subject: String },
}

/// Session shared by every view, kept current by the layout.
#[derive(Clone, Copy)]
pub struct SessionSignal(pub Signal<Session>);

fn redirect_to(navigator: Navigator, target: &str) {
    match target.parse::<Route>() {
        Ok(next) => {
            navigator.replace(next);
        }
        Err(_) => warn!(to = %target, "redirect target is not a known page"),
    }
}

#[component]
fn Layout() -> Element {
    let ctx = use_context::<AppContext>();
    let gatekeeper = ctx.gatekeeper();
    let session = use_signal(|| gatekeeper.current_user());
    use_context_provider(|| SessionSignal(session));

    let route = use_route::<Route>();
    let navigator = use_navigator();
    let mut location = use_signal(|| route.to_string());

    // Session changes: refresh the shared signal and let the gatekeeper redirect.
    use_future({
        let gatekeeper = gatekeeper.clone();
        move || {
            let gatekeeper = gatekeeper.clone();
            let mut session = session;
            async move {
                gatekeeper
                    .observe(
                        move |current: &Session| {
                            session.set(current.clone());
                            PageLocation::parse(&location.peek())
                        },
                        move |target: String| redirect_to(navigator, &target),
                    )
                    .await;
            }
        }
    });

    // Route changes under an unchanged session.
    use_effect(use_reactive!(|route| {
        let path = route.to_string();
        location.set(path.clone());
        let page = PageLocation::parse(&path);
        if let Some(target) = gatekeeper.decide(&page).target() {
            info!(from = %page.path(), to = %target, "redirecting");
            redirect_to(navigator, &target);
        }
    }));

    rsx! {
        div { class: "app",
            NavBar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn NavBar() -> Element {
    let ctx = use_context::<AppContext>();
    let SessionSignal(session) = use_context::<SessionSignal>();
    let mut menu_open = use_signal(|| false);

    let sign_out = {
        let sessions = ctx.sessions();
        move |_: MouseEvent| {
            let sessions = sessions.clone();
            menu_open.set(false);
            spawn(async move {
                if let Err(err) = sessions.sign_out().await {
                    warn!(error = %err, "sign out failed");
                }
            });
        }
    };

    let user = session.read().clone();
    let catalog = ctx.catalog();

    rsx! {
        nav { class: "navbar",
            Link { class: "brand", to: Route::Dashboard {}, "Quiz" }
            ul { class: "nav-links",
                for page in catalog.pages().iter() {
                    li {
                        key: "{page.subject()}",
                        Link {
                            to: Route::Quiz { subject: page.subject().to_string() },
                            "{page.title()}"
                        }
                    }
                }
            }
            match user {
                Some(user) => rsx! {
                    div { class: "profile-menu",
                        button {
                            class: "profile-toggle",
                            onclick: move |_| {
                                let open = menu_open();
                                menu_open.set(!open);
                            },
                            img { class: "avatar", src: "{user.avatar_url()}", alt: "" }
                            span { class: "profile-name", "{user.label()}" }
                        }
                        if menu_open() {
                            div { class: "profile-dropdown",
                                if let Some(email) = user.email.clone() {
                                    p { class: "profile-email", "{email}" }
                                }
                                button { id: "logout", onclick: sign_out, "Log out" }
                            }
                        }
                    }
                },
                None => rsx! {
                    Link {
                        class: "sign-in",
                        to: Route::Login { redirect: String::new() },
                        "Sign in"
                    }
                },
            }
        }
    }
}
