use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{QuizStatus, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum QuestionKind {
    Mcq,
    Free,
}

/// A quiz question as stored in the `questions` JSONB column. The `id` is
/// assigned by position at create/update time and stays stable once the quiz
/// leaves `pending` (content is immutable from that point on).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub(crate) enum Question {
    Mcq {
        id: u32,
        question: String,
        choices: Vec<String>,
        answer: String,
    },
    Free {
        id: u32,
        question: String,
    },
}

impl Question {
    pub(crate) fn id(&self) -> u32 {
        match self {
            Question::Mcq { id, .. } | Question::Free { id, .. } => *id,
        }
    }

    pub(crate) fn text(&self) -> &str {
        match self {
            Question::Mcq { question, .. } | Question::Free { question, .. } => question,
        }
    }

    pub(crate) fn kind(&self) -> QuestionKind {
        match self {
            Question::Mcq { .. } => QuestionKind::Mcq,
            Question::Free { .. } => QuestionKind::Free,
        }
    }
}

/// Per-question grading outcome stored in the `answers` JSONB column of a
/// submission. `is_correct` is `None` for free-response questions, which are
/// recorded but never auto-graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AnswerRecord {
    pub(crate) question_id: u32,
    pub(crate) question_index: u32,
    pub(crate) question: String,
    pub(crate) kind: QuestionKind,
    pub(crate) user_answer: Option<String>,
    pub(crate) correct_answer: Option<String>,
    pub(crate) is_correct: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Quiz {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) questions: Json<Vec<Question>>,
    pub(crate) owner_id: String,
    pub(crate) status: QuizStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Submissions are immutable once written; there is no update surface.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Submission {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) user_id: Option<String>,
    pub(crate) answers: Json<Vec<AnswerRecord>>,
    pub(crate) created_at: PrimitiveDateTime,
}
