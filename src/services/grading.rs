use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::models::{AnswerRecord, Question, QuestionKind};

/// One entry of a submitted answer array. An object without `question_id`
/// correlates to the question at the same position; one carrying
/// `question_id` correlates by stable question id. The two forms cannot be
/// mixed inside one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum SubmittedAnswer {
    Keyed {
        question_id: u32,
        #[serde(default)]
        answer: Option<String>,
    },
    Positional {
        #[serde(default)]
        answer: Option<String>,
    },
}

impl SubmittedAnswer {
    fn answer(&self) -> Option<&str> {
        match self {
            SubmittedAnswer::Keyed { answer, .. } | SubmittedAnswer::Positional { answer } => {
                answer.as_deref()
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum GradingError {
    #[error("expected {expected} answers, received {received}")]
    AnswerCountMismatch { expected: usize, received: usize },
    #[error("answer references unknown question id {0}")]
    UnknownQuestionId(u32),
    #[error("question id {0} answered more than once")]
    DuplicateAnswer(u32),
    #[error("answers must either all carry question ids or none")]
    MixedAnswerModes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GradedSubmission {
    /// Correct multiple-choice answers.
    pub(crate) score: u32,
    /// Gradable (multiple-choice) questions.
    pub(crate) total: u32,
    /// Every question, gradable or not.
    pub(crate) total_questions: u32,
    /// Per-question outcome, in question order.
    pub(crate) records: Vec<AnswerRecord>,
}

/// Grades a submission against the quiz questions. Multiple-choice answers
/// are compared to the stored answer with exact, case-sensitive string
/// equality; free-response answers are recorded verbatim with a null verdict.
/// Pure: no I/O, deterministic for identical inputs.
pub(crate) fn grade(
    questions: &[Question],
    answers: &[SubmittedAnswer],
) -> Result<GradedSubmission, GradingError> {
    if answers.len() != questions.len() {
        return Err(GradingError::AnswerCountMismatch {
            expected: questions.len(),
            received: answers.len(),
        });
    }

    let aligned = align_answers(questions, answers)?;

    let mut records = Vec::with_capacity(questions.len());
    let mut score: u32 = 0;
    let mut total: u32 = 0;

    for (index, question) in questions.iter().enumerate() {
        let user_answer = aligned[index].map(str::to_string);
        let record = match question {
            Question::Mcq { id, question, answer, .. } => {
                let is_correct = user_answer.as_deref() == Some(answer.as_str());
                total += 1;
                if is_correct {
                    score += 1;
                }
                AnswerRecord {
                    question_id: *id,
                    question_index: index as u32,
                    question: question.clone(),
                    kind: QuestionKind::Mcq,
                    user_answer,
                    correct_answer: Some(answer.clone()),
                    is_correct: Some(is_correct),
                }
            }
            Question::Free { id, question } => AnswerRecord {
                question_id: *id,
                question_index: index as u32,
                question: question.clone(),
                kind: QuestionKind::Free,
                user_answer,
                correct_answer: None,
                is_correct: None,
            },
        };
        records.push(record);
    }

    Ok(GradedSubmission { score, total, total_questions: questions.len() as u32, records })
}

/// Produces one answer per question, in question order. Positional answers
/// pair by index; keyed answers pair by question id, each id exactly once.
fn align_answers<'a>(
    questions: &[Question],
    answers: &'a [SubmittedAnswer],
) -> Result<Vec<Option<&'a str>>, GradingError> {
    let keyed = answers
        .iter()
        .filter(|entry| matches!(entry, SubmittedAnswer::Keyed { .. }))
        .count();

    if keyed == 0 {
        return Ok(answers.iter().map(SubmittedAnswer::answer).collect());
    }

    if keyed != answers.len() {
        return Err(GradingError::MixedAnswerModes);
    }

    let known_ids: HashSet<u32> = questions.iter().map(Question::id).collect();
    let mut by_id: HashMap<u32, Option<&str>> = HashMap::with_capacity(answers.len());

    for entry in answers {
        let SubmittedAnswer::Keyed { question_id, answer } = entry else {
            return Err(GradingError::MixedAnswerModes);
        };
        if !known_ids.contains(question_id) {
            return Err(GradingError::UnknownQuestionId(*question_id));
        }
        if by_id.insert(*question_id, answer.as_deref()).is_some() {
            return Err(GradingError::DuplicateAnswer(*question_id));
        }
    }

    // Length equality plus uniqueness means every question is covered.
    Ok(questions.iter().map(|question| by_id[&question.id()]).collect())
}

/// Re-derives score and gradable total from stored per-question records.
/// Read paths never trust a persisted aggregate.
pub(crate) fn score_from_records(records: &[AnswerRecord]) -> (i64, i64) {
    let total = records.iter().filter(|record| record.kind == QuestionKind::Mcq).count() as i64;
    let score = records
        .iter()
        .filter(|record| record.kind == QuestionKind::Mcq && record.is_correct == Some(true))
        .count() as i64;
    (score, total)
}

pub(crate) fn percentage(score: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(id: u32, question: &str, choices: &[&str], answer: &str) -> Question {
        Question::Mcq {
            id,
            question: question.to_string(),
            choices: choices.iter().map(|choice| choice.to_string()).collect(),
            answer: answer.to_string(),
        }
    }

    fn free(id: u32, question: &str) -> Question {
        Question::Free { id, question: question.to_string() }
    }

    fn positional(answer: &str) -> SubmittedAnswer {
        SubmittedAnswer::Positional { answer: Some(answer.to_string()) }
    }

    fn keyed(question_id: u32, answer: &str) -> SubmittedAnswer {
        SubmittedAnswer::Keyed { question_id, answer: Some(answer.to_string()) }
    }

    #[test]
    fn grades_mixed_quiz_counting_only_mcq() {
        let questions = vec![
            mcq(1, "Capitale de la France ?", &["Paris", "Lyon", "Nice", "Lille"], "Paris"),
            free(2, "Décrivez votre réponse."),
        ];
        let answers = vec![positional("Paris"), positional("n'importe quoi")];

        let graded = grade(&questions, &answers).expect("graded");

        assert_eq!(graded.score, 1);
        assert_eq!(graded.total, 1);
        assert_eq!(graded.total_questions, 2);
        assert_eq!(graded.records.len(), 2);
        assert_eq!(graded.records[0].is_correct, Some(true));
        assert_eq!(graded.records[0].correct_answer.as_deref(), Some("Paris"));
        assert_eq!(graded.records[1].is_correct, None);
        assert_eq!(graded.records[1].correct_answer, None);
        assert_eq!(graded.records[1].user_answer.as_deref(), Some("n'importe quoi"));
    }

    #[test]
    fn mcq_comparison_is_exact_and_case_sensitive() {
        let questions = vec![mcq(1, "q", &["B", "b"], "B")];

        let graded = grade(&questions, &[positional("b")]).expect("graded");
        assert_eq!(graded.records[0].is_correct, Some(false));

        let graded = grade(&questions, &[positional(" B")]).expect("graded");
        assert_eq!(graded.records[0].is_correct, Some(false));

        let graded = grade(&questions, &[positional("B")]).expect("graded");
        assert_eq!(graded.records[0].is_correct, Some(true));
        assert_eq!(graded.score, 1);
    }

    #[test]
    fn missing_answer_is_incorrect_for_mcq() {
        let questions = vec![mcq(1, "q", &["A", "B"], "A"), free(2, "texte libre")];
        let answers = vec![
            SubmittedAnswer::Positional { answer: None },
            SubmittedAnswer::Positional { answer: None },
        ];

        let graded = grade(&questions, &answers).expect("graded");

        assert_eq!(graded.score, 0);
        assert_eq!(graded.records[0].is_correct, Some(false));
        assert_eq!(graded.records[0].user_answer, None);
        assert_eq!(graded.records[1].is_correct, None);
    }

    #[test]
    fn rejects_answer_count_mismatch() {
        let questions = vec![mcq(1, "q", &["A", "B"], "A"), free(2, "texte")];

        let short = grade(&questions, &[positional("A")]);
        assert_eq!(short, Err(GradingError::AnswerCountMismatch { expected: 2, received: 1 }));

        let long = grade(&questions, &[positional("A"), positional("x"), positional("y")]);
        assert_eq!(long, Err(GradingError::AnswerCountMismatch { expected: 2, received: 3 }));

        let empty = grade(&questions, &[]);
        assert_eq!(empty, Err(GradingError::AnswerCountMismatch { expected: 2, received: 0 }));
    }

    #[test]
    fn all_free_quiz_has_zero_total() {
        let questions = vec![free(1, "a"), free(2, "b")];
        let answers = vec![positional("x"), positional("y")];

        let graded = grade(&questions, &answers).expect("graded");

        assert_eq!(graded.score, 0);
        assert_eq!(graded.total, 0);
        assert_eq!(graded.total_questions, 2);
        assert!(graded.records.iter().all(|record| record.is_correct.is_none()));
    }

    #[test]
    fn keyed_answers_correlate_by_id_in_any_order() {
        let questions = vec![
            mcq(1, "q1", &["A", "B"], "A"),
            mcq(2, "q2", &["C", "D"], "D"),
            free(3, "q3"),
        ];
        let answers = vec![keyed(3, "libre"), keyed(1, "A"), keyed(2, "D")];

        let graded = grade(&questions, &answers).expect("graded");

        assert_eq!(graded.score, 2);
        assert_eq!(graded.total, 2);
        // Records stay in question order regardless of answer order.
        assert_eq!(graded.records[0].question_id, 1);
        assert_eq!(graded.records[1].question_id, 2);
        assert_eq!(graded.records[2].question_id, 3);
        assert_eq!(graded.records[2].user_answer.as_deref(), Some("libre"));
    }

    #[test]
    fn keyed_answers_reject_unknown_and_duplicate_ids() {
        let questions = vec![mcq(1, "q1", &["A", "B"], "A"), mcq(2, "q2", &["C", "D"], "C")];

        let unknown = grade(&questions, &[keyed(1, "A"), keyed(9, "C")]);
        assert_eq!(unknown, Err(GradingError::UnknownQuestionId(9)));

        let duplicate = grade(&questions, &[keyed(1, "A"), keyed(1, "B")]);
        assert_eq!(duplicate, Err(GradingError::DuplicateAnswer(1)));
    }

    #[test]
    fn rejects_mixed_positional_and_keyed_answers() {
        let questions = vec![mcq(1, "q1", &["A", "B"], "A"), mcq(2, "q2", &["C", "D"], "C")];
        let answers = vec![keyed(1, "A"), positional("C")];

        assert_eq!(grade(&questions, &answers), Err(GradingError::MixedAnswerModes));
    }

    #[test]
    fn score_never_exceeds_total_nor_total_questions() {
        let questions = vec![
            mcq(1, "q1", &["A", "B"], "A"),
            mcq(2, "q2", &["C", "D"], "C"),
            free(3, "q3"),
        ];
        let answers = vec![positional("A"), positional("D"), positional("texte")];

        let graded = grade(&questions, &answers).expect("graded");

        assert!(graded.score <= graded.total);
        assert!(graded.total <= graded.total_questions);
        assert_eq!(graded.score, 1);
        assert_eq!(graded.total, 2);
        assert_eq!(graded.total_questions, 3);
    }

    #[test]
    fn grading_is_deterministic() {
        let questions = vec![mcq(1, "q1", &["A", "B"], "B"), free(2, "q2")];
        let answers = vec![positional("B"), positional("idem")];

        let first = grade(&questions, &answers).expect("graded");
        let second = grade(&questions, &answers).expect("graded");

        assert_eq!(first, second);
    }

    #[test]
    fn rederived_score_matches_grading_output() {
        let questions = vec![
            mcq(1, "q1", &["A", "B"], "A"),
            mcq(2, "q2", &["C", "D"], "D"),
            free(3, "q3"),
        ];
        let answers = vec![positional("A"), positional("C"), positional("libre")];

        let graded = grade(&questions, &answers).expect("graded");
        let (score, total) = score_from_records(&graded.records);

        assert_eq!(score, graded.score as i64);
        assert_eq!(total, graded.total as i64);
    }

    #[test]
    fn percentage_rounds_and_handles_zero_total() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn submitted_answer_accepts_positional_and_keyed_wire_forms() {
        let parsed: Vec<SubmittedAnswer> = serde_json::from_str(
            r#"[{"answer": "Paris"}, {}, {"question_id": 3, "answer": "B"}, {"question_id": 4}]"#,
        )
        .expect("parse");

        assert_eq!(parsed[0], SubmittedAnswer::Positional { answer: Some("Paris".to_string()) });
        assert_eq!(parsed[1], SubmittedAnswer::Positional { answer: None });
        assert_eq!(
            parsed[2],
            SubmittedAnswer::Keyed { question_id: 3, answer: Some("B".to_string()) }
        );
        assert_eq!(parsed[3], SubmittedAnswer::Keyed { question_id: 4, answer: None });
    }
}
