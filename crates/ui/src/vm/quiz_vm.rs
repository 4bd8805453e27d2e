use quiz_core::model::{OptionLetter, QuestionId};
use quiz_core::session::QuestionStatus;
use services::{QuizResult, QuizSnapshot, SubmissionStatus};

use super::time_fmt::format_countdown;

/// Countdown values at or below this are highlighted.
const LOW_TIME_SECS: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub letter: OptionLetter,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusCellVm {
    pub index: usize,
    pub number: usize,
    pub class: String,
    pub current: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseRowVm {
    pub question: String,
    pub selected: String,
    pub outcome: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultVm {
    pub score_line: String,
    pub responses: Vec<ResponseRowVm>,
    pub save_note: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizVm {
    pub question_id: QuestionId,
    pub position: String,
    pub kind: String,
    pub prompt: String,
    pub timer: String,
    pub timer_low: bool,
    pub can_answer: bool,
    pub options: Vec<OptionVm>,
    pub statuses: Vec<StatusCellVm>,
    pub answered_line: String,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    /// Leaving now would abandon the attempt.
    pub in_progress: bool,
    pub result: Option<ResultVm>,
}

fn status_class(status: QuestionStatus) -> &'static str {
    match status {
        QuestionStatus::Answered => "status-answered",
        QuestionStatus::Expired => "status-expired",
        QuestionStatus::Pending => "status-pending",
    }
}

fn save_note(saved: Option<&SubmissionStatus>) -> &'static str {
    match saved {
        None => "Saving your score...",
        Some(SubmissionStatus::Saved(_)) => "Your score has been saved.",
        Some(SubmissionStatus::Failed(_)) => {
            "Your score could not be saved. The result above was not recorded."
        }
    }
}

fn map_result(result: &QuizResult) -> ResultVm {
    ResultVm {
        score_line: format!("You scored {} out of {}", result.score, result.total),
        responses: result
            .responses
            .iter()
            .map(|r| ResponseRowVm {
                question: format!("Question {}", r.question_id),
                selected: r.selected.to_string(),
                outcome: if r.is_correct { "Correct" } else { "Wrong" },
            })
            .collect(),
        save_note: save_note(result.saved.as_ref()),
    }
}

#[must_use]
pub fn map_quiz_snapshot(snapshot: &QuizSnapshot) -> QuizVm {
    let submitted = snapshot.is_submitted();
    QuizVm {
        question_id: snapshot.question.id,
        position: format!("Question {}", snapshot.position_label()),
        kind: snapshot.question.kind.clone(),
        prompt: snapshot.question.prompt.clone(),
        timer: format_countdown(snapshot.remaining_secs),
        timer_low: snapshot.remaining_secs <= LOW_TIME_SECS,
        can_answer: !submitted && snapshot.remaining_secs > 0,
        options: OptionLetter::ALL
            .into_iter()
            .map(|letter| OptionVm {
                letter,
                text: snapshot.question.option(letter).to_string(),
                selected: snapshot.selected == Some(letter),
            })
            .collect(),
        statuses: snapshot
            .statuses
            .iter()
            .enumerate()
            .map(|(index, status)| {
                let current = index == snapshot.index;
                let mut class = format!("status-cell {}", status_class(*status));
                if current {
                    class.push_str(" current");
                }
                StatusCellVm {
                    index,
                    number: index + 1,
                    class,
                    current,
                }
            })
            .collect(),
        answered_line: format!("Answered {} of {}", snapshot.answered, snapshot.total),
        can_go_next: snapshot.can_go_next,
        can_go_previous: snapshot.can_go_previous,
        in_progress: !submitted,
        result: snapshot.result.as_ref().map(map_result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::model::{Question, UserId};
    use quiz_core::session::QuizSession;
    use services::QuizSnapshot;

    fn session() -> QuizSession {
        let questions = (1..=3)
            .map(|id| {
                Question::from_persisted(
                    QuestionId::new(id),
                    "mcq".into(),
                    format!("Prompt {id}"),
                    ["w".into(), "x".into(), "y".into(), "z".into()],
                    OptionLetter::B,
                    Some(6),
                )
            })
            .collect();
        let mut session = QuizSession::new(UserId::new("amy").unwrap(), questions).unwrap();
        session.start();
        session
    }

    #[test]
    fn maps_active_question_and_grid() {
        let mut session = session();
        session.select_answer(QuestionId::new(1), OptionLetter::C);
        let vm = map_quiz_snapshot(&QuizSnapshot::from_session(&session));

        assert_eq!(vm.position, "Question 1 / 3");
        assert_eq!(vm.timer, "0:06");
        assert!(!vm.timer_low);
        assert!(vm.can_answer);
        assert!(vm.options[2].selected);
        assert_eq!(vm.options[3].text, "z");
        assert_eq!(vm.statuses[0].class, "status-cell status-answered current");
        assert!(vm.statuses[0].current);
        assert_eq!(vm.statuses[1].class, "status-cell status-pending");
        assert_eq!(vm.answered_line, "Answered 1 of 3");
        assert!(vm.in_progress);
        assert!(vm.result.is_none());
    }

    #[test]
    fn maps_submitted_result() {
        let mut session = session();
        session.select_answer(QuestionId::new(1), OptionLetter::B);
        session.select_answer(QuestionId::new(2), OptionLetter::A);
        session.submit();
        let snapshot = QuizSnapshot::from_session(&session);
        let vm = map_quiz_snapshot(&snapshot);

        assert!(!vm.can_answer);
        assert!(!vm.in_progress);
        let result = vm.result.unwrap();
        assert_eq!(result.score_line, "You scored 1 out of 3");
        assert_eq!(result.responses.len(), 2);
        assert_eq!(result.responses[0].outcome, "Correct");
        assert_eq!(result.responses[1].outcome, "Wrong");
        assert_eq!(result.save_note, "Saving your score...");

        let failed = snapshot.with_saved(SubmissionStatus::Failed("down".into()));
        let vm = map_quiz_snapshot(&failed);
        assert!(vm.result.unwrap().save_note.contains("could not be saved"));
    }
}
