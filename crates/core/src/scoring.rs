//! Score computation for a finished attempt.

use std::collections::HashMap;

use crate::model::{OptionLetter, Question, QuestionId, Response};

/// Score and the responses that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub score: u32,
    pub responses: Vec<Response>,
}

/// Counts answered questions whose selected letter matches the correct one.
///
/// Unanswered questions are left out of both the score and the response list.
/// Responses follow question order. Letters are compared after case-insensitive
/// parsing, so a stored `"b"` and a selected `B` match.
#[must_use]
pub fn compute_score(
    questions: &[Question],
    answers: &HashMap<QuestionId, OptionLetter>,
) -> ScoreOutcome {
    let mut score = 0_u32;
    let mut responses = Vec::with_capacity(answers.len());

    for question in questions {
        let Some(&selected) = answers.get(&question.id()) else {
            continue;
        };
        let is_correct = question.is_correct(selected);
        if is_correct {
            score = score.saturating_add(1);
        }
        responses.push(Response {
            question_id: question.id(),
            selected,
            is_correct,
        });
    }

    ScoreOutcome { score, responses }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64, correct: &str) -> Question {
        Question::from_persisted(
            QuestionId::new(id),
            "mcq".into(),
            format!("Q{id}"),
            ["a".into(), "b".into(), "c".into(), "d".into()],
            correct.parse().unwrap(),
            Some(30),
        )
    }

    #[test]
    fn unanswered_questions_are_excluded() {
        let questions = vec![question(1, "A"), question(2, "B"), question(3, "C")];
        let answers = HashMap::from([
            (QuestionId::new(1), OptionLetter::A),
            (QuestionId::new(3), OptionLetter::D),
        ]);

        let outcome = compute_score(&questions, &answers);

        assert_eq!(outcome.score, 1);
        assert_eq!(
            outcome.responses,
            vec![
                Response {
                    question_id: QuestionId::new(1),
                    selected: OptionLetter::A,
                    is_correct: true,
                },
                Response {
                    question_id: QuestionId::new(3),
                    selected: OptionLetter::D,
                    is_correct: false,
                },
            ]
        );
    }

    #[test]
    fn lowercase_correct_answer_still_matches() {
        let questions = vec![question(1, "c")];
        let selected: OptionLetter = "C".parse().unwrap();
        let answers = HashMap::from([(QuestionId::new(1), selected)]);
        assert_eq!(compute_score(&questions, &answers).score, 1);
    }

    #[test]
    fn answers_for_unknown_questions_are_ignored() {
        let questions = vec![question(1, "A")];
        let answers = HashMap::from([(QuestionId::new(99), OptionLetter::A)]);
        let outcome = compute_score(&questions, &answers);
        assert_eq!(outcome.score, 0);
        assert!(outcome.responses.is_empty());
    }

    #[test]
    fn recomputing_is_deterministic() {
        let questions: Vec<_> = (1..=6).map(|id| question(id, "B")).collect();
        let answers: HashMap<_, _> = (1..=6)
            .map(|id| {
                let letter = if id % 2 == 0 { OptionLetter::B } else { OptionLetter::A };
                (QuestionId::new(id), letter)
            })
            .collect();

        let first = compute_score(&questions, &answers);
        let second = compute_score(&questions, &answers);
        assert_eq!(first, second);
        assert_eq!(first.score, 3);
        let expected = answers
            .iter()
            .filter(|(id, letter)| {
                questions
                    .iter()
                    .any(|q| q.id() == **id && q.correct_answer() == **letter)
            })
            .count();
        assert_eq!(first.score as usize, expected);
    }
}
