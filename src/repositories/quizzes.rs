use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{Question, Quiz};
use crate::db::types::QuizStatus;

pub(crate) const COLUMNS: &str = "\
    id, name, questions, owner_id, status, created_at, updated_at";

/// Owner-facing list row: counts only, never full question bodies.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OwnerQuizRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) status: QuizStatus,
    pub(crate) question_count: i64,
    pub(crate) participants: i64,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AdminQuizRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) status: QuizStatus,
    pub(crate) owner_id: String,
    pub(crate) owner_name: String,
    pub(crate) question_count: i64,
    pub(crate) participants: i64,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) total_count: i64,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Loads a `started` quiz and share-locks its row for the duration of the
/// surrounding transaction, so a concurrent status toggle commits either
/// before this read or after the caller's insert.
pub(crate) async fn find_started_locked(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {COLUMNS} FROM quizzes WHERE id = $1 AND status = $2 FOR SHARE"
    ))
    .bind(id)
    .bind(QuizStatus::Started)
    .fetch_optional(executor)
    .await
}

pub(crate) struct CreateQuiz<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub questions: Json<Vec<Question>>,
    pub owner_id: &'a str,
    pub status: QuizStatus,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateQuiz<'_>) -> Result<Quiz, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "INSERT INTO quizzes (
            id, name, questions, owner_id, status, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.questions)
    .bind(params.owner_id)
    .bind(params.status)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

/// Replaces name and questions while the quiz is still `pending`. Returns
/// `None` when the quiz has already left `pending` (or vanished), in which
/// case nothing is written.
pub(crate) async fn update_content(
    pool: &PgPool,
    id: &str,
    name: &str,
    questions: Json<Vec<Question>>,
    now: PrimitiveDateTime,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "UPDATE quizzes
         SET name = $1, questions = $2, updated_at = $3
         WHERE id = $4 AND status = $5
         RETURNING {COLUMNS}",
    ))
    .bind(name)
    .bind(questions)
    .bind(now)
    .bind(id)
    .bind(QuizStatus::Pending)
    .fetch_optional(pool)
    .await
}

/// Compare-and-swap status transition. Returns `false` when the row no longer
/// holds `from`, meaning a concurrent transition won.
pub(crate) async fn advance_status(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    from: QuizStatus,
    to: QuizStatus,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE quizzes SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub(crate) async fn list_by_owner_with_counts(
    pool: &PgPool,
    owner_id: &str,
) -> Result<Vec<OwnerQuizRow>, sqlx::Error> {
    sqlx::query_as::<_, OwnerQuizRow>(
        "SELECT q.id, q.name, q.status,
                jsonb_array_length(q.questions)::bigint AS question_count,
                COUNT(s.id) AS participants,
                q.created_at, q.updated_at
         FROM quizzes q
         LEFT JOIN submissions s ON s.quiz_id = q.id
         WHERE q.owner_id = $1
         GROUP BY q.id
         ORDER BY q.created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_all_with_counts(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<Vec<AdminQuizRow>, sqlx::Error> {
    sqlx::query_as::<_, AdminQuizRow>(
        "SELECT q.id, q.name, q.status, q.owner_id,
                COALESCE(u.full_name, 'N/A') AS owner_name,
                jsonb_array_length(q.questions)::bigint AS question_count,
                COALESCE(sc.cnt, 0) AS participants,
                q.created_at,
                COUNT(*) OVER() AS total_count
         FROM quizzes q
         LEFT JOIN users u ON u.id = q.owner_id
         LEFT JOIN (SELECT quiz_id, COUNT(*) AS cnt FROM submissions GROUP BY quiz_id) sc
                ON sc.quiz_id = q.id
         ORDER BY q.created_at DESC
         OFFSET $1 LIMIT $2",
    )
    .bind(skip.max(0))
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}

/// Removes the quiz together with every submission made against it, in one
/// transaction. Returns `false` when no quiz row matched.
pub(crate) async fn delete_with_submissions(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM submissions WHERE quiz_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM quizzes WHERE id = $1").bind(id).execute(&mut *tx).await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}
