use dioxus::prelude::*;
use dioxus_router::use_navigator;
use services::AccountError;

use crate::context::{AppContext, AuthState};
use crate::routes::Route;
use crate::views::ViewError;

#[component]
pub fn AdminLoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut auth = use_context::<Signal<AuthState>>();
    let navigator = use_navigator();
    let mut username = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<ViewError>);

    let on_login = move |_| {
        let accounts = ctx.accounts();
        let name = username();
        let pw = password();
        spawn(async move {
            match accounts.verify_admin(&name, &pw).await {
                Ok(admin) => {
                    error.set(None);
                    password.set(String::new());
                    auth.write().admin = Some(admin);
                    navigator.push(Route::Admin {});
                }
                Err(AccountError::InvalidCredentials) => {
                    error.set(Some(ViewError::InvalidCredentials));
                }
                Err(_) => error.set(Some(ViewError::Unknown)),
            }
        });
    };

    rsx! {
        div { class: "page",
            h2 { "Admin sign in" }
            section { class: "login",
                label { r#for: "admin-user", "Username" }
                input {
                    id: "admin-user",
                    r#type: "text",
                    value: "{username}",
                    oninput: move |evt| username.set(evt.value()),
                }
                label { r#for: "admin-password", "Password" }
                input {
                    id: "admin-password",
                    r#type: "password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    onclick: on_login,
                    "Sign in"
                }
                if let Some(err) = error() {
                    p { class: "error", "{err.message()}" }
                }
            }
        }
    }
}
