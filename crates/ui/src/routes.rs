use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator};

use crate::context::{AttemptGuard, AuthState, confirm_leave_attempt};
use crate::views::{AdminLoginView, AdminView, HomeView, QuizView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/quiz", QuizView)] Quiz {},
        #[route("/admin/login", AdminLoginView)] AdminLogin {},
        #[route("/admin", AdminView)] Admin {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let mut auth = use_context::<Signal<AuthState>>();
    let guard = use_context::<Signal<AttemptGuard>>();
    let user = auth.read().user.clone();
    let admin = auth.read().admin.clone();

    rsx! {
        nav { class: "sidebar",
            h1 { "Quiz" }
            ul {
                li { SidebarLink { to: Route::Home {}, label: "Home" } }
                if user.is_some() {
                    li { SidebarLink { to: Route::Quiz {}, label: "Take quiz" } }
                }
                if admin.is_some() {
                    li { SidebarLink { to: Route::Admin {}, label: "Admin" } }
                } else {
                    li { SidebarLink { to: Route::AdminLogin {}, label: "Admin login" } }
                }
            }
            if let Some(user) = user {
                p { class: "signed-in", "Signed in as {user}" }
            }
            if let Some(admin) = admin {
                p { class: "signed-in", "Admin: {admin}" }
            }
            if auth.read().user.is_some() || auth.read().admin.is_some() {
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| {
                        let in_progress = guard.read().in_progress;
                        spawn(async move {
                            if !in_progress || confirm_leave_attempt().await {
                                auth.set(AuthState::default());
                            }
                        });
                    },
                    "Sign out"
                }
            }
        }
    }
}

/// A sidebar link that asks before abandoning an open quiz attempt.
#[component]
fn SidebarLink(to: Route, label: &'static str) -> Element {
    let guard = use_context::<Signal<AttemptGuard>>();
    let navigator = use_navigator();

    if !guard.read().in_progress {
        return rsx! { Link { to, "{label}" } };
    }

    let target = to.clone();
    rsx! {
        Link {
            to,
            onclick_only: true,
            onclick: move |_| {
                let target = target.clone();
                spawn(async move {
                    if confirm_leave_attempt().await {
                        navigator.push(target);
                    }
                });
            },
            "{label}"
        }
    }
}
