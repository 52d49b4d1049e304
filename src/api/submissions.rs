use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::submission::ParticipationResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/mine", get(list_my_participations))
}

/// History of the caller's own submissions, newest first. Anonymous
/// submissions carry no user id and never show up here.
async fn list_my_participations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ParticipationResponse>>, ApiError> {
    let rows = repositories::submissions::list_by_user(state.db(), &user.id)
        .await
        .map_err(|err| ApiError::internal(err, "list participations"))?;

    Ok(Json(rows.into_iter().map(ParticipationResponse::from_row).collect()))
}
