use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_author, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::QuizStatus;
use crate::repositories;
use crate::schemas::quiz::{
    assign_question_ids, GenerateRequest, GenerateResponse, QuizCreate, QuizResponse,
};
use crate::services::quiz_generation::QuizGenerationService;

pub(in crate::api::quizzes) async fn create_quiz(
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<QuizCreate>,
) -> Result<(axum::http::StatusCode, Json<QuizResponse>), ApiError> {
    require_author(&user)?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let questions = assign_question_ids(payload.questions);

    let now = primitive_now_utc();
    let quiz = repositories::quizzes::create(
        state.db(),
        repositories::quizzes::CreateQuiz {
            id: &Uuid::new_v4().to_string(),
            name: &payload.name,
            questions: sqlx::types::Json(questions),
            owner_id: &user.id,
            status: QuizStatus::Pending,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create quiz"))?;

    tracing::info!(
        user_id = %user.id,
        quiz_id = %quiz.id,
        action = "quiz_create",
        "Quiz created"
    );

    Ok((axum::http::StatusCode::CREATED, Json(QuizResponse::from_db(quiz))))
}

pub(in crate::api::quizzes) async fn generate_quiz(
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    require_author(&user)?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let service = QuizGenerationService::from_settings(state.settings())
        .map_err(|e| ApiError::internal(e, "Failed to build generation client"))?;

    if !service.is_configured() {
        return Err(ApiError::ServiceUnavailable("Quiz generation is not configured".to_string()));
    }

    let drafted = service
        .generate(&payload.theme, payload.num_questions, user.role)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to generate questions"))?;

    tracing::info!(
        user_id = %user.id,
        theme = %payload.theme,
        count = drafted.len(),
        action = "quiz_generate",
        "Questions generated"
    );

    Ok(Json(GenerateResponse::new(assign_question_ids(drafted))))
}
