use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::{require_author, CurrentUser};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::quiz::OwnerQuizSummaryResponse;

pub(in crate::api::quizzes) async fn list_my_quizzes(
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<Vec<OwnerQuizSummaryResponse>>, ApiError> {
    require_author(&user)?;

    let rows = repositories::quizzes::list_by_owner_with_counts(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quizzes"))?;

    Ok(Json(rows.into_iter().map(OwnerQuizSummaryResponse::from_row).collect()))
}
