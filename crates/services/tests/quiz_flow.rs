use quiz_core::model::{OptionLetter, QuestionDraft, UserId};
use quiz_core::session::{AdvanceOutcome, SubmitOutcome, TickOutcome};
use quiz_core::time::fixed_now;
use services::{AppServices, Clock, SubmissionStatus};
use storage::repository::Storage;

fn draft(prompt: &str, correct: &str) -> QuestionDraft {
    QuestionDraft {
        kind: "mcq".into(),
        prompt: prompt.into(),
        options: ["one".into(), "two".into(), "three".into(), "four".into()],
        correct_answer: correct.into(),
        time_limit_secs: Some(30),
    }
}

#[tokio::test]
async fn admin_builds_bank_and_user_score_is_recorded() {
    let services = AppServices::from_storage(&Storage::in_memory(), Clock::Fixed(fixed_now()));

    let questions = services.questions();
    let q1 = questions.add_question(draft("First", "A")).await.unwrap();
    let _q2 = questions.add_question(draft("Second", "B")).await.unwrap();
    let q3 = questions.add_question(draft("Third", "C")).await.unwrap();

    let accounts = services.accounts();
    accounts.set_password("amy", "secret").await.unwrap();
    let user = accounts.verify_user("amy", "secret").await.unwrap();

    let quiz = services.quiz();
    let mut session = quiz.start_quiz(user.clone()).await.unwrap();

    // Q1 correct, then its countdown runs out.
    session.select_answer(q1, OptionLetter::A);
    loop {
        let token = session.timer_token().expect("timer running");
        if let TickOutcome::Expired(outcome) = session.tick(token) {
            assert!(matches!(outcome, AdvanceOutcome::Moved { index: 1, .. }));
            break;
        }
    }
    // Q2 skipped, Q3 wrong.
    session.go_next();
    session.select_answer(q3, OptionLetter::D);

    let SubmitOutcome::Submitted(draft) = session.submit() else {
        panic!("expected submission");
    };
    assert_eq!(draft.score, 1);
    assert!(matches!(
        quiz.record_submission(&draft).await,
        SubmissionStatus::Saved(_)
    ));
    assert_eq!(session.submit(), SubmitOutcome::AlreadySubmitted);

    let scores = services.scores().list_for_user(&user).await.unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].score, 1);
    assert_eq!(scores[0].submitted_at, fixed_now());
    let flags: Vec<_> = scores[0]
        .responses
        .iter()
        .map(|r| (r.question_id, r.is_correct))
        .collect();
    assert_eq!(flags, vec![(q1, true), (q3, false)]);

    let outcome = questions.delete_question(q1).await.unwrap();
    assert!(outcome.had_responses);
    assert_eq!(services.scores().list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn runner_drives_session_to_persisted_score() {
    let services = AppServices::from_storage(&Storage::in_memory(), Clock::Fixed(fixed_now()));
    let q1 = services
        .questions()
        .add_question(draft("Only", "b"))
        .await
        .unwrap();

    let session = services
        .quiz()
        .start_quiz(UserId::new("ben").unwrap())
        .await
        .unwrap();
    let handle = services.runner().spawn(session);

    assert!(
        handle
            .send(services::QuizCommand::Select(q1, OptionLetter::B))
            .await
    );
    assert!(handle.send(services::QuizCommand::Submit).await);

    let exit = handle.join().await.unwrap();
    assert!(matches!(
        exit,
        services::RunnerExit::Submitted(SubmissionStatus::Saved(_))
    ));

    let all = services.scores().list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].score, 1);
}
