//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{common::QuizMetadata, phase::SessionPhase};

/// Payload for registering a new quiz in the catalog.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateQuizRequest {
    /// Quiz name: 3 to 30 alphanumeric characters and spaces, unique per owner.
    #[validate(length(min = 3, max = 30))]
    pub name: String,
    /// Free-form description, at most 100 characters.
    #[validate(length(max = 100))]
    #[serde(default)]
    pub description: String,
}

/// Response carrying the id of a freshly created quiz.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateQuizResponse {
    pub quiz_id: Uuid,
}

/// One answer option of a question being created.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerInput {
    pub answer: String,
    pub correct: bool,
}

/// Payload for appending a question to a quiz.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateQuestionRequest {
    pub question: String,
    /// Seconds the question stays open.
    pub duration: u32,
    /// Points for the first fully correct responder.
    pub points: u32,
    pub thumbnail_url: String,
    pub answers: Vec<AnswerInput>,
}

/// Response carrying the id of a freshly created question.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateQuestionResponse {
    pub question_id: Uuid,
}

/// Payload for starting a live session from a quiz.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// Accepted in the range 1..=50; currently has no effect on start behavior.
    pub auto_start_num: u32,
}

/// Response carrying the id of a freshly started session.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
}

/// Payload driving a session phase transition.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Action name, e.g. `NEXT_QUESTION` or `END`.
    pub action: String,
}

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

/// Session ids for one quiz, split by liveness.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionListResponse {
    /// Sessions in any phase but END, ids sorted.
    pub active_sessions: Vec<Uuid>,
    /// Sessions in the END phase, ids sorted.
    pub inactive_sessions: Vec<Uuid>,
}

/// Full admin-facing status of one session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionStatusResponse {
    pub phase: SessionPhase,
    /// 1-based current question position (0 before the first question).
    pub at_question: usize,
    /// Player display names in join order.
    pub players: Vec<String>,
    /// Immutable quiz snapshot the session plays.
    pub metadata: QuizMetadata,
}
