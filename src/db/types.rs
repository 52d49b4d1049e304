use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    User,
    Ecole,
    Entreprise,
    Admin,
}

impl UserRole {
    /// Roles allowed to own quizzes.
    pub(crate) fn can_author(self) -> bool {
        matches!(self, UserRole::Ecole | UserRole::Entreprise)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "quizstatus", rename_all = "lowercase")]
pub(crate) enum QuizStatus {
    Pending,
    Started,
    Finish,
}

impl QuizStatus {
    /// Forward-only lifecycle step; `Finish` is terminal.
    pub(crate) fn next(self) -> Option<QuizStatus> {
        match self {
            QuizStatus::Pending => Some(QuizStatus::Started),
            QuizStatus::Started => Some(QuizStatus::Finish),
            QuizStatus::Finish => None,
        }
    }
}

