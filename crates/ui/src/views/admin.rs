use dioxus::prelude::*;
use dioxus_router::Link;
use quiz_core::model::{OptionLetter, QuestionId};

use crate::context::{AppContext, AuthState};
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    QuestionForm, QuestionRowVm, ScoreRowVm, account_error_message, delete_message,
    map_question_rows, map_score_rows, password_message, question_error_message,
};

#[component]
pub fn AdminView() -> Element {
    let auth = use_context::<Signal<AuthState>>();
    let signed_in = auth.read().admin.is_some();

    rsx! {
        div { class: "page",
            h2 { "Admin" }
            if signed_in {
                AdminPanel {}
            } else {
                p { "Admin sign-in required." }
                Link { to: Route::AdminLogin {}, "Go to admin sign in" }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct AdminData {
    questions: Vec<QuestionRowVm>,
    scores: Vec<ScoreRowVm>,
}

fn blank_form() -> QuestionForm {
    QuestionForm {
        kind: "mcq".to_string(),
        correct: OptionLetter::A.to_string(),
        ..QuestionForm::default()
    }
}

#[component]
fn AdminPanel() -> Element {
    let ctx = use_context::<AppContext>();
    let questions = ctx.questions();
    let scores = ctx.scores();
    let mut message = use_signal(|| None::<String>);

    let resource = use_resource(move || {
        let questions = questions.clone();
        let scores = scores.clone();
        async move {
            let question_items = questions
                .list_questions()
                .await
                .map_err(|_| ViewError::Unknown)?;
            let score_items = scores.list_all().await.map_err(|_| ViewError::Unknown)?;
            Ok(AdminData {
                questions: map_question_rows(&question_items),
                scores: map_score_rows(&score_items),
            })
        }
    });
    let state = view_state_from_resource(&resource);

    let on_delete = {
        let questions = ctx.questions();
        move |id: QuestionId| {
            let questions = questions.clone();
            let mut resource = resource;
            spawn(async move {
                let text = match questions.delete_question(id).await {
                    Ok(outcome) => delete_message(outcome).to_string(),
                    Err(err) => question_error_message(&err),
                };
                message.set(Some(text));
                resource.restart();
            });
        }
    };

    rsx! {
        if let Some(text) = message() {
            p { class: "notice", "{text}" }
        }
        AddQuestionForm {
            on_saved: move |text: String| {
                message.set(Some(text));
                let mut resource = resource;
                resource.restart();
            },
        }
        match state {
            ViewState::Idle | ViewState::Loading => rsx! {
                p { "Loading..." }
            },
            ViewState::Ready(data) => rsx! {
                section { class: "admin-questions",
                    h3 { "Questions ({data.questions.len()})" }
                    if data.questions.is_empty() {
                        p { "No questions yet." }
                    } else {
                        ul {
                            for row in data.questions {
                                QuestionRow { row, on_delete: on_delete.clone() }
                            }
                        }
                    }
                }
                section { class: "admin-scores",
                    h3 { "Scores" }
                    if data.scores.is_empty() {
                        p { "No attempts recorded." }
                    } else {
                        table {
                            thead {
                                tr {
                                    th { "#" }
                                    th { "User" }
                                    th { "Score" }
                                    th { "Answered" }
                                    th { "Taken" }
                                }
                            }
                            tbody {
                                for row in data.scores {
                                    tr { key: "{row.id_label}",
                                        td { "{row.id_label}" }
                                        td { "{row.user}" }
                                        td { "{row.score}" }
                                        td { "{row.answered}" }
                                        td { "{row.submitted_at}" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            ViewState::Error(err) => rsx! {
                p { class: "error", "{err.message()}" }
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
        SetPasswordForm {}
    }
}

#[component]
fn QuestionRow(row: QuestionRowVm, on_delete: EventHandler<QuestionId>) -> Element {
    let id = row.id;
    rsx! {
        li { key: "{row.id_label}", class: "question-row",
            p {
                span { class: "question-id", "#{row.id_label} " }
                span { class: "question-kind", "[{row.kind}] " }
                "{row.prompt}"
            }
            ul { class: "question-options",
                for option in row.options {
                    li { "{option}" }
                }
            }
            p { "Correct: {row.correct} | Timer: {row.timer}" }
            button {
                class: "btn btn-danger",
                r#type: "button",
                onclick: move |_| on_delete.call(id),
                "Delete"
            }
        }
    }
}

#[component]
fn AddQuestionForm(on_saved: EventHandler<String>) -> Element {
    let ctx = use_context::<AppContext>();
    let mut form = use_signal(blank_form);
    let mut error = use_signal(|| None::<String>);

    let on_submit = move |_| {
        let questions = ctx.questions();
        let draft = match form.read().to_draft() {
            Ok(draft) => draft,
            Err(text) => {
                error.set(Some(text));
                return;
            }
        };
        spawn(async move {
            match questions.add_question(draft).await {
                Ok(id) => {
                    error.set(None);
                    form.set(blank_form());
                    on_saved.call(format!("Question #{id} added."));
                }
                Err(err) => error.set(Some(question_error_message(&err))),
            }
        });
    };

    rsx! {
        section { class: "admin-add",
            h3 { "Add question" }
            label { r#for: "q-kind", "Type" }
            input {
                id: "q-kind",
                r#type: "text",
                value: "{form.read().kind}",
                oninput: move |evt| form.write().kind = evt.value(),
            }
            label { r#for: "q-prompt", "Question" }
            textarea {
                id: "q-prompt",
                value: "{form.read().prompt}",
                oninput: move |evt| form.write().prompt = evt.value(),
            }
            for (i, letter) in OptionLetter::ALL.into_iter().enumerate() {
                label { key: "{letter}", r#for: "q-option-{letter}", "Option {letter}" }
                input {
                    id: "q-option-{letter}",
                    r#type: "text",
                    value: "{form.read().options[i]}",
                    oninput: move |evt| form.write().options[i] = evt.value(),
                }
            }
            label { r#for: "q-correct", "Correct answer" }
            select {
                id: "q-correct",
                value: "{form.read().correct}",
                onchange: move |evt| form.write().correct = evt.value(),
                for letter in OptionLetter::ALL {
                    option { value: "{letter}", "{letter}" }
                }
            }
            label { r#for: "q-timer", "Timer (seconds, blank for default)" }
            input {
                id: "q-timer",
                r#type: "text",
                value: "{form.read().timer}",
                oninput: move |evt| form.write().timer = evt.value(),
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: on_submit,
                "Add question"
            }
            if let Some(text) = error() {
                p { class: "error", "{text}" }
            }
        }
    }
}

#[component]
fn SetPasswordForm() -> Element {
    let ctx = use_context::<AppContext>();
    let mut account = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut is_admin = use_signal(|| false);
    let mut message = use_signal(|| None::<String>);

    let on_submit = move |_| {
        let accounts = ctx.accounts();
        let name = account();
        let pw = password();
        let admin = is_admin();
        spawn(async move {
            let result = if admin {
                accounts.set_admin_password(&name, &pw).await
            } else {
                accounts.set_password(&name, &pw).await
            };
            let text = match result {
                Ok(set) => {
                    password.set(String::new());
                    password_message(set).to_string()
                }
                Err(err) => account_error_message(&err),
            };
            message.set(Some(text));
        });
    };

    rsx! {
        section { class: "admin-passwords",
            h3 { "Set password" }
            label { r#for: "pw-account", "User id" }
            input {
                id: "pw-account",
                r#type: "text",
                value: "{account}",
                oninput: move |evt| account.set(evt.value()),
            }
            label { r#for: "pw-password", "New password" }
            input {
                id: "pw-password",
                r#type: "password",
                value: "{password}",
                oninput: move |evt| password.set(evt.value()),
            }
            label {
                input {
                    r#type: "checkbox",
                    checked: is_admin(),
                    onchange: move |evt| is_admin.set(evt.checked()),
                }
                " Admin account"
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: on_submit,
                "Save password"
            }
            if let Some(text) = message() {
                p { class: "notice", "{text}" }
            }
        }
    }
}
