use dioxus::prelude::*;
use tracing::warn;

use services::SessionProviderError;

use crate::context::AppContext;
use crate::views::ViewError;

fn map_provider_error(err: &SessionProviderError) -> ViewError {
    match err {
        SessionProviderError::InvalidEmail => ViewError::InvalidEmail,
        SessionProviderError::EmptyPassword => ViewError::MissingPassword,
        _ => ViewError::Unknown,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    SignIn,
    SignUp,
}

/// Sign-in form. Redirecting away once signed in is left to the layout.
#[component]
pub fn LoginView(redirect: String) -> Element {
    let ctx = use_context::<AppContext>();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut display_name = use_signal(String::new);
    let mut mode = use_signal(|| Mode::SignIn);
    let mut error = use_signal(|| None::<ViewError>);
    let mut busy = use_signal(|| false);

    let submit = {
        let sessions = ctx.sessions();
        move |evt: FormEvent| {
            evt.prevent_default();
            if busy() {
                return;
            }
            busy.set(true);
            let sessions = sessions.clone();
            let email = email();
            let password = password();
            let name = display_name();
            let current_mode = mode();
            spawn(async move {
                let result = match current_mode {
                    Mode::SignIn => sessions.sign_in(&email, &password).await,
                    Mode::SignUp => {
                        let name = Some(name.as_str()).filter(|n| !n.trim().is_empty());
                        sessions.sign_up(&email, &password, name).await
                    }
                };
                match result {
                    Ok(_) => error.set(None),
                    Err(err) => {
                        warn!(error = %err, "sign in rejected");
                        error.set(Some(map_provider_error(&err)));
                    }
                }
                busy.set(false);
            });
        }
    };

    let is_sign_up = mode() == Mode::SignUp;
    let heading = if is_sign_up { "Create account" } else { "Sign in" };

    rsx! {
        div { class: "page login",
            h2 { "{heading}" }
            if !redirect.is_empty() {
                p { class: "hint", "Sign in to continue to your quiz." }
            }
            form { onsubmit: submit,
                if is_sign_up {
                    label { r#for: "display-name", "Name" }
                    input {
                        id: "display-name",
                        r#type: "text",
                        value: "{display_name}",
                        oninput: move |evt| display_name.set(evt.value()),
                    }
                }
                label { r#for: "email", "Email" }
                input {
                    id: "email",
                    r#type: "email",
                    value: "{email}",
                    oninput: move |evt| email.set(evt.value()),
                }
                label { r#for: "password", "Password" }
                input {
                    id: "password",
                    r#type: "password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                if let Some(err) = error() {
                    p { class: "error", "{err.message()}" }
                }
                button { class: "primary", r#type: "submit", disabled: busy(), "{heading}" }
            }
            button {
                class: "link",
                onclick: move |_| {
                    error.set(None);
                    mode.set(if is_sign_up { Mode::SignIn } else { Mode::SignUp });
                },
                if is_sign_up { "Already have an account? Sign in" } else { "New here? Create an account" }
            }
        }
    }
}
