use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{AnswerRecord, Submission};

const COLUMNS: &str = "id, quiz_id, user_id, answers, created_at";

/// A submission joined with its participant, for owner-facing score lists.
/// `user_id`, `full_name` and `email` are NULL for anonymous participants.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ParticipantRow {
    pub(crate) id: String,
    pub(crate) user_id: Option<String>,
    pub(crate) full_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) answers: Json<Vec<AnswerRecord>>,
    pub(crate) created_at: PrimitiveDateTime,
}

/// A submission joined with its quiz, for a participant's own history.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ParticipationRow {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_name: String,
    pub(crate) owner_name: String,
    pub(crate) answers: Json<Vec<AnswerRecord>>,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) struct CreateSubmission<'a> {
    pub id: &'a str,
    pub quiz_id: &'a str,
    pub user_id: Option<&'a str>,
    pub answers: Json<Vec<AnswerRecord>>,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateSubmission<'_>,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (id, quiz_id, user_id, answers, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.quiz_id)
    .bind(params.user_id)
    .bind(params.answers)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id_for_quiz(
    pool: &PgPool,
    id: &str,
    quiz_id: &str,
) -> Result<Option<ParticipantRow>, sqlx::Error> {
    sqlx::query_as::<_, ParticipantRow>(
        "SELECT s.id, s.user_id, u.full_name, u.email, s.answers, s.created_at
         FROM submissions s
         LEFT JOIN users u ON u.id = s.user_id
         WHERE s.id = $1 AND s.quiz_id = $2",
    )
    .bind(id)
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_participants(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Vec<ParticipantRow>, sqlx::Error> {
    sqlx::query_as::<_, ParticipantRow>(
        "SELECT s.id, s.user_id, u.full_name, u.email, s.answers, s.created_at
         FROM submissions s
         LEFT JOIN users u ON u.id = s.user_id
         WHERE s.quiz_id = $1
         ORDER BY s.created_at DESC",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<ParticipationRow>, sqlx::Error> {
    sqlx::query_as::<_, ParticipationRow>(
        "SELECT s.id, s.quiz_id, q.name AS quiz_name,
                COALESCE(u.full_name, 'N/A') AS owner_name,
                s.answers, s.created_at
         FROM submissions s
         JOIN quizzes q ON q.id = s.quiz_id
         LEFT JOIN users u ON u.id = q.owner_id
         WHERE s.user_id = $1
         ORDER BY s.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
