use quiz_core::model::{OptionLetter, Question, QuestionDraft, QuestionId, ScoreRecord};
use services::{AccountError, DeleteOutcome, PasswordSet, QuestionServiceError};

use super::time_fmt::format_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionRowVm {
    pub id: QuestionId,
    pub id_label: String,
    pub kind: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: String,
    pub timer: String,
}

#[must_use]
pub fn map_question_rows(questions: &[Question]) -> Vec<QuestionRowVm> {
    questions
        .iter()
        .map(|q| QuestionRowVm {
            id: q.id(),
            id_label: q.id().to_string(),
            kind: q.kind().to_string(),
            prompt: q.prompt().to_string(),
            options: OptionLetter::ALL
                .into_iter()
                .map(|letter| format!("{letter}. {}", q.option(letter)))
                .collect(),
            correct: q.correct_answer().to_string(),
            timer: format!("{}s", q.time_limit_secs()),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreRowVm {
    pub id_label: String,
    pub user: String,
    pub score: u32,
    pub answered: usize,
    pub submitted_at: String,
}

#[must_use]
pub fn map_score_rows(scores: &[ScoreRecord]) -> Vec<ScoreRowVm> {
    scores
        .iter()
        .map(|s| ScoreRowVm {
            id_label: s.id.to_string(),
            user: s.user_id.to_string(),
            score: s.score,
            answered: s.answered(),
            submitted_at: format_datetime(s.submitted_at),
        })
        .collect()
}

/// Raw text of the add-question form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionForm {
    pub kind: String,
    pub prompt: String,
    pub options: [String; 4],
    pub correct: String,
    pub timer: String,
}

impl QuestionForm {
    /// Convert the form into a draft; a blank timer means the default limit.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message when the timer is not a whole number.
    pub fn to_draft(&self) -> Result<QuestionDraft, String> {
        let timer = self.timer.trim();
        let time_limit_secs = if timer.is_empty() {
            None
        } else {
            Some(
                timer
                    .parse::<u32>()
                    .map_err(|_| format!("Timer must be a whole number of seconds (got {timer:?})."))?,
            )
        };

        Ok(QuestionDraft {
            kind: self.kind.clone(),
            prompt: self.prompt.clone(),
            options: self.options.clone(),
            correct_answer: self.correct.clone(),
            time_limit_secs,
        })
    }
}

#[must_use]
pub fn question_error_message(err: &QuestionServiceError) -> String {
    match err {
        QuestionServiceError::Question(inner) => format!("Invalid question: {inner}."),
        QuestionServiceError::NotFound => "Question not found.".to_string(),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}

#[must_use]
pub fn delete_message(outcome: DeleteOutcome) -> &'static str {
    if outcome.had_responses {
        "Question deleted. Note: it had existing responses."
    } else {
        "Question deleted."
    }
}

#[must_use]
pub fn password_message(set: PasswordSet) -> &'static str {
    match set {
        PasswordSet::Created => "Password set. A new user was created.",
        PasswordSet::Updated => "Password updated.",
    }
}

#[must_use]
pub fn account_error_message(err: &AccountError) -> String {
    match err {
        AccountError::InvalidCredentials => "Invalid username or password.".to_string(),
        AccountError::EmptyPassword
        | AccountError::EmptyAccount
        | AccountError::UserId(_) => format!("{err}."),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::model::{Response, ScoreId, UserId};
    use quiz_core::time::fixed_now;

    #[test]
    fn blank_timer_means_default_and_garbage_is_rejected() {
        let mut form = QuestionForm {
            prompt: "Q".into(),
            correct: "a".into(),
            ..QuestionForm::default()
        };
        assert_eq!(form.to_draft().unwrap().time_limit_secs, None);

        form.timer = " 45 ".into();
        assert_eq!(form.to_draft().unwrap().time_limit_secs, Some(45));

        form.timer = "soon".into();
        assert!(form.to_draft().unwrap_err().contains("whole number"));
    }

    #[test]
    fn maps_question_and_score_rows() {
        let question = Question::from_persisted(
            QuestionId::new(4),
            "mcq".into(),
            "Pick".into(),
            ["a".into(), "b".into(), "c".into(), "d".into()],
            OptionLetter::D,
            Some(12),
        );
        let rows = map_question_rows(&[question]);
        assert_eq!(rows[0].options[3], "D. d");
        assert_eq!(rows[0].correct, "D");
        assert_eq!(rows[0].timer, "12s");

        let record = ScoreRecord {
            id: ScoreId::new(2),
            user_id: UserId::new("amy").unwrap(),
            score: 1,
            responses: vec![Response {
                question_id: QuestionId::new(4),
                selected: OptionLetter::D,
                is_correct: true,
            }],
            submitted_at: fixed_now(),
        };
        let rows = map_score_rows(&[record]);
        assert_eq!(rows[0].user, "amy");
        assert_eq!(rows[0].answered, 1);
        assert_eq!(rows[0].submitted_at, "2023-11-14 22:13");
    }

    #[test]
    fn delete_message_mentions_existing_responses() {
        assert!(delete_message(DeleteOutcome { had_responses: true }).contains("existing responses"));
        assert_eq!(
            delete_message(DeleteOutcome {
                had_responses: false
            }),
            "Question deleted."
        );
    }
}
