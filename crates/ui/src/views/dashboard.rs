use dioxus::prelude::*;
use dioxus_router::Link;

use services::dashboard::RECENT_ATTEMPTS_LIMIT;

use crate::context::AppContext;
use crate::routes::{Route, SessionSignal};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{AttemptRowVm, DashboardVm, SubjectCardVm, map_dashboard};

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let SessionSignal(session) = use_context::<SessionSignal>();
    let dashboard = ctx.dashboard();

    let resource = use_resource(move || {
        let dashboard = dashboard.clone();
        let user = session.read().clone();
        async move {
            let Some(user) = user else {
                return Ok::<_, ViewError>(None);
            };
            let data = dashboard
                .load(&user, RECENT_ATTEMPTS_LIMIT)
                .await
                .map_err(|_| ViewError::Unknown)?;
            Ok(Some(map_dashboard(&data)))
        }
    });

    let state = view_state_from_resource(resource);
    let catalog = ctx.catalog();

    rsx! {
        div { class: "page dashboard",
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(Some(data)) => rsx! {
                    SignedInDashboard { data }
                },
                ViewState::Ready(None) => rsx! {
                    h2 { "Practice web development" }
                    p { "Pick a quiz to get started. Sign in to keep track of your scores." }
                    ul { class: "subject-list",
                        for page in catalog.pages().iter() {
                            li { key: "{page.subject()}",
                                Link {
                                    class: "subject-link",
                                    to: Route::Quiz { subject: page.subject().to_string() },
                                    "{page.title()}"
                                }
                            }
                        }
                    }
                    Link {
                        class: "primary",
                        to: Route::Login { redirect: String::new() },
                        "Sign in"
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn SignedInDashboard(data: DashboardVm) -> Element {
    rsx! {
        h2 { "{data.greeting}" }
        section { class: "subject-cards",
            for card in data.cards {
                SubjectCardItem { key: "{card.subject}", card }
            }
        }
        section { class: "recent",
            h3 { "Recent attempts" }
            if data.recent.is_empty() {
                p { "No attempts yet." }
            } else {
                ul {
                    for row in data.recent {
                        AttemptRow { key: "{row.id}", row }
                    }
                }
            }
        }
    }
}

#[component]
pub fn SubjectCardItem(card: SubjectCardVm) -> Element {
    rsx! {
        article { class: "subject-card",
            h3 { "{card.title}" }
            p { class: "score", "Last score: {card.score_label}" }
            div { class: "progress",
                div { class: "progress-bar", style: "width: {card.progress}%;" }
            }
            p { class: "progress-label", "{card.progress}%" }
            if let Some(date) = card.last_attempt_str.clone() {
                p { class: "last-attempt", "Last attempt: {date}" }
            }
            Link {
                class: "primary",
                to: Route::Quiz { subject: card.subject.clone() },
                "Start quiz"
            }
        }
    }
}

#[component]
pub fn AttemptRow(row: AttemptRowVm) -> Element {
    rsx! {
        li { class: "attempt-row",
            span { class: "attempt-subject", "{row.subject}" }
            span { class: "attempt-score", "{row.score_label} ({row.percentage}%)" }
            span { class: "attempt-duration", "{row.duration_str}" }
            span { class: "attempt-date", "{row.created_at_str}" }
        }
    }
}
