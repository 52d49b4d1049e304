use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::{ListQuery, PaginatedResponse};
use crate::api::quizzes::helpers;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::quiz::{AdminQuizResponse, ToggleResponse};
use crate::schemas::user::{OnlineUserResponse, OnlineUsersResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/quizzes", get(list_all_quizzes))
        .route("/quizzes/:quiz_id/toggle", post(toggle_any_quiz))
        .route("/quizzes/:quiz_id", delete(delete_any_quiz))
        .route("/online-users", get(online_users))
}

/// Every quiz on the platform, newest first, with owner and participation
/// counts. Owners who deleted their account show up as "N/A".
async fn list_all_quizzes(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Query(params): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<AdminQuizResponse>>, ApiError> {
    let skip = params.skip.max(0);
    let limit = params.limit.clamp(1, 1000);

    let rows = repositories::quizzes::list_all_with_counts(state.db(), skip, limit)
        .await
        .map_err(|err| ApiError::internal(err, "list quizzes"))?;

    let total_count = rows.first().map(|row| row.total_count).unwrap_or(0);
    let items = rows.into_iter().map(AdminQuizResponse::from_row).collect();

    Ok(Json(PaginatedResponse { items, total_count, skip, limit }))
}

async fn toggle_any_quiz(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(quiz_id): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let quiz = helpers::fetch_quiz(&state, &quiz_id).await?;
    let response = helpers::advance_quiz_status(&state, quiz).await?;

    tracing::info!(
        admin_id = %admin.id,
        quiz_id = %response.id,
        status = ?response.status,
        action = "admin_quiz_toggle"
    );

    Ok(Json(response))
}

async fn delete_any_quiz(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(quiz_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::quizzes::delete_with_submissions(state.db(), &quiz_id)
        .await
        .map_err(|err| ApiError::internal(err, "delete quiz"))?;
    if !deleted {
        return Err(ApiError::NotFound("Quiz not found".to_string()));
    }

    tracing::info!(admin_id = %admin.id, quiz_id = %quiz_id, action = "admin_quiz_delete");

    Ok(StatusCode::NO_CONTENT)
}

/// Users seen by an authenticated request within the presence TTL. The
/// requesting admin's own guard counts as activity, so they always appear.
async fn online_users(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> Json<OnlineUsersResponse> {
    let entries = state.presence().snapshot().await;
    let users: Vec<OnlineUserResponse> =
        entries.into_iter().map(OnlineUserResponse::from_entry).collect();

    Json(OnlineUsersResponse { count: users.len(), users })
}

#[cfg(test)]
mod tests;
