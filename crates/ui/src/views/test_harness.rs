use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::UserId;
use quiz_core::time::fixed_clock;
use services::{
    AccountService, AppServices, QuestionService, QuizRunner, QuizService, ScoreService,
};
use storage::repository::Storage;

use crate::context::{AttemptGuard, AuthState, UiApp, build_app_context};
use crate::views::{AdminView, HomeView, QuizView};

#[derive(Clone)]
struct TestApp {
    prefill_user: Option<UserId>,
    services: AppServices,
}

impl UiApp for TestApp {
    fn prefill_user(&self) -> Option<UserId> {
        self.prefill_user.clone()
    }

    fn quiz(&self) -> Arc<QuizService> {
        self.services.quiz()
    }

    fn runner(&self) -> Arc<QuizRunner> {
        self.services.runner()
    }

    fn questions(&self) -> Arc<QuestionService> {
        self.services.questions()
    }

    fn accounts(&self) -> Arc<AccountService> {
        self.services.accounts()
    }

    fn scores(&self) -> Arc<ScoreService> {
        self.services.scores()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Quiz,
    Admin,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    auth: AuthState,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| Signal::new(props.auth.clone()));
    use_context_provider(|| Signal::new(AttemptGuard::default()));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Quiz => rsx! {
            QuizView {}
            AttemptFlag {}
        },
        ViewKind::Admin => rsx! { AdminView {} },
    }
}

/// Renders the attempt guard so tests can see it.
#[component]
fn AttemptFlag() -> Element {
    let guard = use_context::<Signal<AttemptGuard>>();
    let label = if guard.read().in_progress {
        "attempt-open"
    } else {
        "attempt-closed"
    };
    rsx! { span { class: "attempt-flag", "{label}" } }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
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

    /// Drive pending work until the rendered html contains `needle`.
    pub async fn render_until(&mut self, needle: &str) -> String {
        for _ in 0..20 {
            let html = self.render();
            if html.contains(needle) {
                return html;
            }
            self.drive_async().await;
        }
        self.render()
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Services over fresh in-memory storage with a fixed clock.
pub fn test_services() -> AppServices {
    AppServices::from_storage(&Storage::in_memory(), fixed_clock())
}

pub fn setup_view_harness(
    view: ViewKind,
    services: &AppServices,
    auth: AuthState,
    prefill_user: Option<UserId>,
) -> ViewHarness {
    let app = Arc::new(TestApp {
        prefill_user,
        services: services.clone(),
    });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view, auth });
    ViewHarness { dom }
}
