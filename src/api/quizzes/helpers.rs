use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Quiz, User};
use crate::repositories;
use crate::schemas::quiz::ToggleResponse;

pub(crate) async fn fetch_quiz(state: &AppState, quiz_id: &str) -> Result<Quiz, ApiError> {
    repositories::quizzes::find_by_id(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))
}

/// Loads the quiz and checks the caller owns it. Absent ids are 404,
/// foreign quizzes 403.
pub(crate) async fn fetch_owned_quiz(
    state: &AppState,
    quiz_id: &str,
    user: &User,
) -> Result<Quiz, ApiError> {
    let quiz = fetch_quiz(state, quiz_id).await?;

    if quiz.owner_id != user.id {
        return Err(ApiError::Forbidden("You do not own this quiz"));
    }

    Ok(quiz)
}

/// Moves the quiz one step along `pending -> started -> finish`. The UPDATE
/// is conditioned on the status we read, so of two concurrent toggles only
/// one wins; the loser gets a conflict.
pub(crate) async fn advance_quiz_status(
    state: &AppState,
    quiz: Quiz,
) -> Result<ToggleResponse, ApiError> {
    let Some(next) = quiz.status.next() else {
        return Err(ApiError::Conflict("Finished quizzes cannot be toggled".to_string()));
    };

    let advanced = repositories::quizzes::advance_status(
        state.db(),
        &quiz.id,
        quiz.status,
        next,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update quiz status"))?;

    if !advanced {
        return Err(ApiError::Conflict("Quiz status changed concurrently".to_string()));
    }

    Ok(ToggleResponse { id: quiz.id, status: next })
}
