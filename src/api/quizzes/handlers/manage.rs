use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentUser, OptionalUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::QuizStatus;
use crate::repositories;
use crate::schemas::quiz::{
    assign_question_ids, PublicQuizResponse, QuizCreate, QuizResponse, ToggleResponse,
};

use super::super::helpers;

/// Owners see the full quiz in any status; everyone else gets the stripped
/// display view, and only once the quiz has started.
pub(in crate::api::quizzes) async fn get_quiz(
    axum::extract::Path(quiz_id): axum::extract::Path<String>,
    OptionalUser(user): OptionalUser,
    state: axum::extract::State<AppState>,
) -> Result<axum::response::Response, ApiError> {
    let quiz = helpers::fetch_quiz(&state, &quiz_id).await?;

    let is_owner = matches!(&user, Some(u) if u.id == quiz.owner_id);
    if is_owner {
        return Ok(Json(QuizResponse::from_db(quiz)).into_response());
    }

    if quiz.status != QuizStatus::Started {
        return Err(ApiError::NotFound("Quiz not found or not open".to_string()));
    }

    Ok(Json(PublicQuizResponse::from_db(quiz)).into_response())
}

pub(in crate::api::quizzes) async fn update_quiz(
    axum::extract::Path(quiz_id): axum::extract::Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<QuizCreate>,
) -> Result<Json<QuizResponse>, ApiError> {
    let quiz = helpers::fetch_owned_quiz(&state, &quiz_id, &user).await?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if quiz.status != QuizStatus::Pending {
        return Err(ApiError::Conflict("Only pending quizzes can be updated".to_string()));
    }

    let questions = assign_question_ids(payload.questions);

    let updated = repositories::quizzes::update_content(
        state.db(),
        &quiz_id,
        &payload.name,
        sqlx::types::Json(questions),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update quiz"))?;

    // The write is conditioned on `pending`; losing that condition between
    // the read above and here means a toggle slipped in.
    let Some(updated) = updated else {
        return Err(ApiError::Conflict("Only pending quizzes can be updated".to_string()));
    };

    Ok(Json(QuizResponse::from_db(updated)))
}

pub(in crate::api::quizzes) async fn delete_quiz(
    axum::extract::Path(quiz_id): axum::extract::Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<axum::http::StatusCode, ApiError> {
    helpers::fetch_owned_quiz(&state, &quiz_id, &user).await?;

    let deleted = repositories::quizzes::delete_with_submissions(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete quiz"))?;

    if !deleted {
        return Err(ApiError::NotFound("Quiz not found".to_string()));
    }

    tracing::info!(
        user_id = %user.id,
        quiz_id = %quiz_id,
        action = "quiz_delete",
        "Quiz deleted with its submissions"
    );

    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub(in crate::api::quizzes) async fn toggle_quiz(
    axum::extract::Path(quiz_id): axum::extract::Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let quiz = helpers::fetch_owned_quiz(&state, &quiz_id, &user).await?;
    let response = helpers::advance_quiz_status(&state, quiz).await?;

    tracing::info!(
        user_id = %user.id,
        quiz_id = %response.id,
        status = ?response.status,
        action = "quiz_toggle",
        "Quiz status advanced"
    );

    Ok(Json(response))
}
