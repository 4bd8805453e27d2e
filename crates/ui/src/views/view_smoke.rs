use quiz_core::model::{QuestionDraft, UserId};
use services::AppServices;

use super::test_harness::{ViewKind, setup_view_harness, test_services};
use crate::context::AuthState;

fn draft(prompt: &str, correct: &str, timer: Option<u32>) -> QuestionDraft {
    QuestionDraft {
        kind: "mcq".into(),
        prompt: prompt.into(),
        options: ["red".into(), "green".into(), "blue".into(), "gold".into()],
        correct_answer: correct.into(),
        time_limit_secs: timer,
    }
}

fn signed_in_user(id: &str) -> AuthState {
    AuthState {
        user: Some(UserId::new(id).unwrap()),
        admin: None,
    }
}

async fn seed_questions(services: &AppServices) {
    let questions = services.questions();
    questions
        .add_question(draft("Sky colour?", "C", None))
        .await
        .expect("add question");
    questions
        .add_question(draft("Grass colour?", "B", Some(20)))
        .await
        .expect("add question");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_login_with_prefill() {
    let services = test_services();
    let mut harness = setup_view_harness(
        ViewKind::Home,
        &services,
        AuthState::default(),
        Some(UserId::new("amy").unwrap()),
    );
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Sign in to take the quiz"), "missing login in {html}");
    assert!(html.contains("value=\"amy\""), "missing prefill in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_lists_own_scores() {
    let services = test_services();
    seed_questions(&services).await;
    let user = UserId::new("amy").unwrap();
    let mut session = services.quiz().start_quiz(user.clone()).await.unwrap();
    let quiz_core::session::SubmitOutcome::Submitted(score) = session.submit() else {
        panic!("expected submission");
    };
    services.quiz().record_submission(&score).await;

    let mut harness = setup_view_harness(ViewKind::Home, &services, signed_in_user("amy"), None);
    harness.rebuild();
    let html = harness.render_until("2023-11-14 22:13").await;
    assert!(html.contains("Welcome, amy."), "missing greeting in {html}");
    assert!(html.contains("Start quiz"), "missing start link in {html}");
    assert!(html.contains("2023-11-14 22:13"), "missing score row in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_first_question() {
    let services = test_services();
    seed_questions(&services).await;

    let mut harness = setup_view_harness(ViewKind::Quiz, &services, signed_in_user("amy"), None);
    harness.rebuild();
    let html = harness.render_until("Sky colour?").await;
    assert!(html.contains("Question 1 / 2"), "missing position in {html}");
    assert!(html.contains("0:30"), "missing countdown in {html}");
    assert!(html.contains("gold"), "missing option in {html}");
    assert!(html.contains("status-cell status-pending current"), "missing grid in {html}");
    assert!(html.contains("Answered 0 of 2"), "missing progress in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_marks_attempt_open() {
    let services = test_services();
    seed_questions(&services).await;

    let mut harness = setup_view_harness(ViewKind::Quiz, &services, signed_in_user("amy"), None);
    harness.rebuild();
    let html = harness.render_until("attempt-open").await;
    assert!(html.contains("Sky colour?"), "missing question in {html}");
    assert!(html.contains("attempt-open"), "attempt not marked open in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_reports_empty_bank() {
    let services = test_services();
    let mut harness = setup_view_harness(ViewKind::Quiz, &services, signed_in_user("amy"), None);
    harness.rebuild();
    let html = harness.render_until("no questions yet").await;
    assert!(html.contains("There are no questions yet"), "missing message in {html}");
    assert!(!html.contains("Retry"), "unexpected retry in {html}");
    assert!(html.contains("attempt-closed"), "empty bank left attempt open in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_requires_sign_in() {
    let services = test_services();
    let mut harness = setup_view_harness(ViewKind::Quiz, &services, AuthState::default(), None);
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Sign in before taking the quiz"), "missing prompt in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn admin_view_smoke_requires_admin() {
    let services = test_services();
    let mut harness = setup_view_harness(ViewKind::Admin, &services, signed_in_user("amy"), None);
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Admin sign-in required"), "missing gate in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn admin_view_smoke_lists_questions() {
    let services = test_services();
    seed_questions(&services).await;
    let auth = AuthState {
        user: None,
        admin: Some("root".into()),
    };
    let mut harness = setup_view_harness(ViewKind::Admin, &services, auth, None);
    harness.rebuild();
    let html = harness.render_until("Grass colour?").await;
    assert!(html.contains("Questions (2)"), "missing count in {html}");
    assert!(html.contains("Timer: 30s"), "missing default timer in {html}");
    assert!(html.contains("Timer: 20s"), "missing custom timer in {html}");
    assert!(html.contains("No attempts recorded."), "missing scores section in {html}");
    assert!(html.contains("Set password"), "missing password form in {html}");
}
