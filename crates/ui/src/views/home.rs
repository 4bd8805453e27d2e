use dioxus::prelude::*;
use dioxus_router::Link;
use quiz_core::model::UserId;
use services::AccountError;

use crate::context::{AppContext, AuthState};
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ScoreRowVm, map_score_rows};

#[component]
pub fn HomeView() -> Element {
    let auth = use_context::<Signal<AuthState>>();
    let user = auth.read().user.clone();

    rsx! {
        div { class: "page",
            h2 { "Home" }
            match user {
                Some(user_id) => rsx! { UserHome { user_id } },
                None => rsx! { UserLogin {} },
            }
        }
    }
}

#[component]
fn UserLogin() -> Element {
    let ctx = use_context::<AppContext>();
    let mut auth = use_context::<Signal<AuthState>>();
    let prefill = ctx.prefill_user().map(|id| id.to_string()).unwrap_or_default();
    let mut user_id = use_signal(move || prefill);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<ViewError>);
    let mut busy = use_signal(|| false);

    let on_login = move |_| {
        if busy() {
            return;
        }
        let accounts = ctx.accounts();
        let id = user_id();
        let pw = password();
        busy.set(true);
        spawn(async move {
            match accounts.verify_user(&id, &pw).await {
                Ok(verified) => {
                    error.set(None);
                    password.set(String::new());
                    auth.write().user = Some(verified);
                }
                Err(AccountError::InvalidCredentials) => {
                    error.set(Some(ViewError::InvalidCredentials));
                }
                Err(_) => error.set(Some(ViewError::Unknown)),
            }
            busy.set(false);
        });
    };

    rsx! {
        section { class: "login",
            h3 { "Sign in to take the quiz" }
            label { r#for: "login-user", "User id" }
            input {
                id: "login-user",
                r#type: "text",
                value: "{user_id}",
                oninput: move |evt| user_id.set(evt.value()),
            }
            label { r#for: "login-password", "Password" }
            input {
                id: "login-password",
                r#type: "password",
                value: "{password}",
                oninput: move |evt| password.set(evt.value()),
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: busy(),
                onclick: on_login,
                "Sign in"
            }
            if let Some(err) = error() {
                p { class: "error", "{err.message()}" }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct HomeData {
    scores: Vec<ScoreRowVm>,
}

#[component]
fn UserHome(user_id: UserId) -> Element {
    let ctx = use_context::<AppContext>();
    let scores = ctx.scores();
    let for_resource = user_id.clone();

    let resource = use_resource(move || {
        let scores = scores.clone();
        let user_id = for_resource.clone();
        async move {
            let items = scores
                .list_for_user(&user_id)
                .await
                .map_err(|_| ViewError::Unknown)?;
            Ok(HomeData {
                scores: map_score_rows(&items),
            })
        }
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        section { class: "welcome",
            p { "Welcome, {user_id}." }
            Link { class: "btn btn-primary", to: Route::Quiz {}, "Start quiz" }
        }
        section { class: "my-scores",
            h3 { "Your scores" }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    if data.scores.is_empty() {
                        p { "No attempts yet." }
                    } else {
                        table {
                            thead {
                                tr {
                                    th { "Taken" }
                                    th { "Score" }
                                    th { "Answered" }
                                }
                            }
                            tbody {
                                for row in data.scores {
                                    tr { key: "{row.id_label}",
                                        td { "{row.submitted_at}" }
                                        td { "{row.score}" }
                                        td { "{row.answered}" }
                                    }
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
            }
        }
    }
}
