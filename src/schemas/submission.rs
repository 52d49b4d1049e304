use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::AnswerRecord;
use crate::repositories::submissions::{ParticipantRow, ParticipationRow};
use crate::services::grading::{self, GradedSubmission, SubmittedAnswer};

/// Display name for submissions without an authenticated participant.
const ANONYMOUS_NAME: &str = "Anonyme";

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    pub(crate) answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionReceipt {
    pub(crate) message: String,
    pub(crate) score: u32,
    pub(crate) total: u32,
    pub(crate) total_questions: u32,
    pub(crate) results: Vec<AnswerRecord>,
}

impl SubmissionReceipt {
    pub(crate) fn from_graded(graded: GradedSubmission) -> Self {
        Self {
            message: "Quizz soumis avec succès".to_string(),
            score: graded.score,
            total: graded.total,
            total_questions: graded.total_questions,
            results: graded.records,
        }
    }
}

/// One row of the owner-facing participant list. Score and total are
/// re-derived from the stored per-question records on every read.
#[derive(Debug, Serialize)]
pub(crate) struct ParticipantScoreResponse {
    pub(crate) submission_id: String,
    pub(crate) user_id: Option<String>,
    pub(crate) user_name: String,
    pub(crate) user_email: Option<String>,
    pub(crate) score: i64,
    pub(crate) total: i64,
    pub(crate) submitted_at: String,
}

impl ParticipantScoreResponse {
    pub(crate) fn from_row(row: ParticipantRow) -> Self {
        let (score, total) = grading::score_from_records(&row.answers.0);
        Self {
            submission_id: row.id,
            user_id: row.user_id,
            user_name: row.full_name.unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
            user_email: row.email,
            score,
            total,
            submitted_at: format_primitive(row.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ParticipantsResponse {
    pub(crate) quiz_name: String,
    pub(crate) participants: Vec<ParticipantScoreResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerDetailResponse {
    pub(crate) quiz_name: String,
    pub(crate) user_name: String,
    pub(crate) user_email: Option<String>,
    pub(crate) score: i64,
    pub(crate) total: i64,
    pub(crate) submitted_at: String,
    pub(crate) answers: Vec<AnswerRecord>,
}

impl AnswerDetailResponse {
    pub(crate) fn from_row(quiz_name: String, row: ParticipantRow) -> Self {
        let (score, total) = grading::score_from_records(&row.answers.0);
        Self {
            quiz_name,
            user_name: row.full_name.unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
            user_email: row.email,
            score,
            total,
            submitted_at: format_primitive(row.created_at),
            answers: row.answers.0,
        }
    }
}

/// One row of a participant's own history.
#[derive(Debug, Serialize)]
pub(crate) struct ParticipationResponse {
    pub(crate) submission_id: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_name: String,
    pub(crate) owner_name: String,
    pub(crate) score: i64,
    pub(crate) total: i64,
    pub(crate) percentage: i64,
    pub(crate) submitted_at: String,
}

impl ParticipationResponse {
    pub(crate) fn from_row(row: ParticipationRow) -> Self {
        let (score, total) = grading::score_from_records(&row.answers.0);
        Self {
            submission_id: row.id,
            quiz_id: row.quiz_id,
            quiz_name: row.quiz_name,
            owner_name: row.owner_name,
            score,
            total,
            percentage: grading::percentage(score, total),
            submitted_at: format_primitive(row.created_at),
        }
    }
}
