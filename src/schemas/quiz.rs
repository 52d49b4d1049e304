use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Question, Quiz};
use crate::db::types::QuizStatus;
use crate::repositories::quizzes::{AdminQuizRow, OwnerQuizRow};

/// Question as authored by a client or drafted by generation, before the
/// store assigns stable ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub(crate) enum QuestionPayload {
    Mcq { question: String, choices: Vec<String>, answer: String },
    Free { question: String },
}

/// Assigns 1-based ids in payload order. Ids are regenerated on every
/// content write; content is only writable while the quiz is `pending`, so
/// ids are stable by the time participants can reference them.
pub(crate) fn assign_question_ids(questions: Vec<QuestionPayload>) -> Vec<Question> {
    questions
        .into_iter()
        .zip(1u32..)
        .map(|(payload, id)| match payload {
            QuestionPayload::Mcq { question, choices, answer } => {
                Question::Mcq { id, question, choices, answer }
            }
            QuestionPayload::Free { question } => Question::Free { id, question },
        })
        .collect()
}

/// Payload for creating a quiz, and for replacing the name and questions of
/// a `pending` one.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[validate(length(min = 1, message = "questions must not be empty"))]
    pub(crate) questions: Vec<QuestionPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GenerateRequest {
    #[validate(length(min = 1, message = "theme must not be empty"))]
    pub(crate) theme: String,
    #[serde(alias = "numQuestions")]
    #[validate(range(min = 1, max = 20, message = "num_questions must be between 1 and 20"))]
    pub(crate) num_questions: u32,
}

/// Drafted questions returned with ids already assigned; nothing is stored
/// until the client posts them back through Create.
#[derive(Debug, Serialize)]
pub(crate) struct GenerateResponse {
    pub(crate) message: String,
    pub(crate) questions: Vec<Question>,
}

impl GenerateResponse {
    pub(crate) fn new(questions: Vec<Question>) -> Self {
        Self { message: "Questions générées avec succès".to_string(), questions }
    }
}

/// Owner-facing view: questions carry their stored answers.
#[derive(Debug, Serialize)]
pub(crate) struct QuizResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) questions: Vec<Question>,
    pub(crate) owner_id: String,
    pub(crate) status: QuizStatus,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuizResponse {
    pub(crate) fn from_db(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            name: quiz.name,
            questions: quiz.questions.0,
            owner_id: quiz.owner_id,
            status: quiz.status,
            created_at: format_primitive(quiz.created_at),
            updated_at: format_primitive(quiz.updated_at),
        }
    }
}

/// Participant-facing question: the correct answer never leaves the server.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub(crate) enum PublicQuestion {
    Mcq { id: u32, question: String, choices: Vec<String> },
    Free { id: u32, question: String },
}

impl PublicQuestion {
    fn from_question(question: Question) -> Self {
        match question {
            Question::Mcq { id, question, choices, .. } => {
                PublicQuestion::Mcq { id, question, choices }
            }
            Question::Free { id, question } => PublicQuestion::Free { id, question },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PublicQuizResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) questions: Vec<PublicQuestion>,
    pub(crate) owner_id: String,
    pub(crate) status: QuizStatus,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl PublicQuizResponse {
    pub(crate) fn from_db(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            name: quiz.name,
            questions: quiz.questions.0.into_iter().map(PublicQuestion::from_question).collect(),
            owner_id: quiz.owner_id,
            status: quiz.status,
            created_at: format_primitive(quiz.created_at),
            updated_at: format_primitive(quiz.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OwnerQuizSummaryResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) status: QuizStatus,
    pub(crate) question_count: i64,
    pub(crate) participants: i64,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl OwnerQuizSummaryResponse {
    pub(crate) fn from_row(row: OwnerQuizRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            status: row.status,
            question_count: row.question_count,
            participants: row.participants,
            created_at: format_primitive(row.created_at),
            updated_at: format_primitive(row.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminQuizResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) status: QuizStatus,
    pub(crate) owner_id: String,
    pub(crate) owner_name: String,
    pub(crate) question_count: i64,
    pub(crate) participants: i64,
    pub(crate) created_at: String,
}

impl AdminQuizResponse {
    pub(crate) fn from_row(row: AdminQuizRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            status: row.status,
            owner_id: row.owner_id,
            owner_name: row.owner_name,
            question_count: row.question_count,
            participants: row.participants,
            created_at: format_primitive(row.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ToggleResponse {
    pub(crate) id: String,
    pub(crate) status: QuizStatus,
}
