use dioxus::prelude::*;
use dioxus_router::Router;

use crate::context::{AttemptGuard, AuthState};
use crate::routes::Route;

#[component]
pub fn App() -> Element {
    use_context_provider(|| Signal::new(AuthState::default()));
    use_context_provider(|| Signal::new(AttemptGuard::default()));

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }

        // Stable OS/window title. Per-route titles are rendered inside the right pane.
        document::Title { "Quiz" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
