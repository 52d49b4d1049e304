use axum::Json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentUser, OptionalUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::submission::{
    AnswerDetailResponse, ParticipantScoreResponse, ParticipantsResponse, SubmissionReceipt,
    SubmitRequest,
};
use crate::services::grading;

use super::super::helpers;

/// Grades and records a submission in one transaction. The quiz row is
/// share-locked while `started`, so a concurrent toggle to `finish` either
/// lands before this read or waits until the submission is committed; a
/// grading failure rolls everything back and nothing is stored.
pub(in crate::api::quizzes) async fn submit_quiz(
    axum::extract::Path(quiz_id): axum::extract::Path<String>,
    OptionalUser(user): OptionalUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let quiz = repositories::quizzes::find_started_locked(&mut *tx, &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?;

    let Some(quiz) = quiz else {
        return Err(ApiError::NotFound("Quiz not found or not open".to_string()));
    };

    let graded = grading::grade(&quiz.questions.0, &payload.answers)?;

    let user_id = user.as_ref().map(|u| u.id.as_str());
    let submission_id = Uuid::new_v4().to_string();
    repositories::submissions::create(
        &mut *tx,
        repositories::submissions::CreateSubmission {
            id: &submission_id,
            quiz_id: &quiz.id,
            user_id,
            answers: sqlx::types::Json(graded.records.clone()),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to record submission"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        quiz_id = %quiz.id,
        submission_id = %submission_id,
        score = graded.score,
        total = graded.total,
        anonymous = user_id.is_none(),
        action = "quiz_submit",
        "Submission recorded"
    );

    Ok(Json(SubmissionReceipt::from_graded(graded)))
}

pub(in crate::api::quizzes) async fn list_participants(
    axum::extract::Path(quiz_id): axum::extract::Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<ParticipantsResponse>, ApiError> {
    let quiz = helpers::fetch_owned_quiz(&state, &quiz_id, &user).await?;

    let rows = repositories::submissions::list_participants(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list participants"))?;

    Ok(Json(ParticipantsResponse {
        quiz_name: quiz.name,
        participants: rows.into_iter().map(ParticipantScoreResponse::from_row).collect(),
    }))
}

pub(in crate::api::quizzes) async fn get_answer_detail(
    axum::extract::Path((quiz_id, submission_id)): axum::extract::Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<AnswerDetailResponse>, ApiError> {
    let quiz = helpers::fetch_owned_quiz(&state, &quiz_id, &user).await?;

    let row = repositories::submissions::find_by_id_for_quiz(state.db(), &submission_id, &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?;

    let Some(row) = row else {
        return Err(ApiError::NotFound("Submission not found".to_string()));
    };

    Ok(Json(AnswerDetailResponse::from_row(quiz.name, row)))
}
