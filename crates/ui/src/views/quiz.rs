use dioxus::prelude::*;
use dioxus_router::Link;
use quiz_core::model::UserId;
use services::{QuizCommand, QuizError, QuizSnapshot};
use tokio::sync::mpsc;

use crate::context::{AppContext, AttemptGuard, AuthState};
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{QuizVm, ResultVm, map_quiz_snapshot};

#[component]
pub fn QuizView() -> Element {
    let auth = use_context::<Signal<AuthState>>();
    let user = auth.read().user.clone();

    rsx! {
        div { class: "page",
            h2 { "Quiz" }
            match user {
                Some(user_id) => rsx! { QuizRun { user_id } },
                None => rsx! {
                    p { "Sign in before taking the quiz." }
                    Link { to: Route::Home {}, "Go to sign in" }
                },
            }
        }
    }
}

/// Starts one attempt and mirrors the runner's snapshots into signals.
///
/// Leaving the page drops the runner handle, which abandons an unsubmitted
/// attempt without saving it. `AttemptGuard` tracks whether that would happen
/// so the sidebar can ask first.
#[component]
fn QuizRun(user_id: UserId) -> Element {
    let ctx = use_context::<AppContext>();
    let quiz = ctx.quiz();
    let runner = ctx.runner();
    let commands = use_signal(|| None::<mpsc::Sender<QuizCommand>>);
    let snapshot = use_signal(|| None::<QuizSnapshot>);
    let mut guard = use_context::<Signal<AttemptGuard>>();

    use_effect(move || {
        let in_progress = snapshot
            .read()
            .as_ref()
            .is_some_and(|current| !current.is_submitted());
        if guard.peek().in_progress != in_progress {
            guard.set(AttemptGuard { in_progress });
        }
    });
    use_drop(move || {
        if let Ok(mut current) = guard.try_write() {
            current.in_progress = false;
        }
    });

    let resource = use_resource(move || {
        let quiz = quiz.clone();
        let runner = runner.clone();
        let user_id = user_id.clone();
        let mut commands = commands;
        let mut snapshot = snapshot;
        async move {
            commands.set(None);
            snapshot.set(None);
            let session = quiz.start_quiz(user_id).await.map_err(|err| match err {
                QuizError::NoQuestions => ViewError::NoQuestions,
                _ => ViewError::Unknown,
            })?;

            let handle = runner.spawn(session);
            let mut updates = handle.subscribe();
            snapshot.set(Some(handle.current()));
            commands.set(Some(handle.sender()));
            spawn(async move {
                let _handle = handle;
                while updates.changed().await.is_ok() {
                    let next = updates.borrow_and_update().clone();
                    snapshot.set(Some(next));
                }
            });
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    let send = move |command: QuizCommand| {
        let Some(tx) = commands.peek().clone() else {
            return;
        };
        spawn(async move {
            let _ = tx.send(command).await;
        });
    };

    let vm = snapshot.read().as_ref().map(map_quiz_snapshot);

    rsx! {
        match state {
            ViewState::Idle | ViewState::Loading => rsx! {
                p { "Loading..." }
            },
            ViewState::Ready(()) => match vm {
                Some(vm) => rsx! {
                    QuizPanel { vm, on_command: move |command| send(command) }
                },
                None => rsx! {
                    p { "Loading..." }
                },
            },
            ViewState::Error(err @ ViewError::NoQuestions) => rsx! {
                p { class: "error", "{err.message()}" }
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
    }
}

#[component]
fn QuizPanel(vm: QuizVm, on_command: EventHandler<QuizCommand>) -> Element {
    if let Some(result) = vm.result {
        return rsx! { QuizResultPanel { result } };
    }

    let question_id = vm.question_id;
    let timer_class = if vm.timer_low { "timer timer-low" } else { "timer" };

    rsx! {
        section { class: "quiz",
            header { class: "quiz-header",
                span { class: "quiz-position", "{vm.position}" }
                span { class: "{timer_class}", "{vm.timer}" }
            }
            p { class: "quiz-kind", "{vm.kind}" }
            p { class: "quiz-prompt", "{vm.prompt}" }
            div { class: "quiz-options",
                for option in vm.options {
                    button {
                        key: "{option.letter}",
                        class: if option.selected { "option selected" } else { "option" },
                        r#type: "button",
                        disabled: !vm.can_answer,
                        onclick: move |_| on_command.call(QuizCommand::Select(question_id, option.letter)),
                        span { class: "option-letter", "{option.letter}" }
                        span { class: "option-text", "{option.text}" }
                    }
                }
            }
            if !vm.can_answer {
                p { class: "quiz-expired", "Time is up for this question." }
            }
            nav { class: "quiz-nav",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: !vm.can_go_previous,
                    onclick: move |_| on_command.call(QuizCommand::Previous),
                    "Previous"
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: !vm.can_go_next,
                    onclick: move |_| on_command.call(QuizCommand::Next),
                    "Next"
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    onclick: move |_| on_command.call(QuizCommand::Submit),
                    "Submit"
                }
            }
            p { class: "quiz-progress", "{vm.answered_line}" }
            div { class: "status-grid",
                for cell in vm.statuses {
                    button {
                        key: "{cell.index}",
                        class: "{cell.class}",
                        r#type: "button",
                        onclick: move |_| on_command.call(QuizCommand::GoTo(cell.index)),
                        "{cell.number}"
                    }
                }
            }
        }
    }
}

#[component]
fn QuizResultPanel(result: ResultVm) -> Element {
    rsx! {
        section { class: "quiz-result",
            h3 { "Quiz submitted" }
            p { class: "score-line", "{result.score_line}" }
            if result.responses.is_empty() {
                p { "No answers were selected." }
            } else {
                table {
                    thead {
                        tr {
                            th { "Question" }
                            th { "Your answer" }
                            th { "Result" }
                        }
                    }
                    tbody {
                        for row in result.responses {
                            tr {
                                td { "{row.question}" }
                                td { "{row.selected}" }
                                td { "{row.outcome}" }
                            }
                        }
                    }
                }
            }
            p { class: "save-note", "{result.save_note}" }
            Link { to: Route::Home {}, "Back to home" }
        }
    }
}
