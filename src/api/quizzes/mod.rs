mod handlers;
pub(crate) mod helpers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_quiz).get(handlers::list_my_quizzes))
        .route("/generate", post(handlers::generate_quiz))
        .route(
            "/:quiz_id",
            get(handlers::get_quiz).put(handlers::update_quiz).delete(handlers::delete_quiz),
        )
        .route("/:quiz_id/toggle", post(handlers::toggle_quiz))
        .route("/:quiz_id/submit", post(handlers::submit_quiz))
        .route("/:quiz_id/participants", get(handlers::list_participants))
        .route("/:quiz_id/answers/:submission_id", get(handlers::get_answer_detail))
}
