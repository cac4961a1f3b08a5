//! DTO definitions used by the player-facing REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dto::phase::SessionPhase, state::session::ChatMessage};

/// Payload for joining a session from the lobby.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinRequest {
    pub session_id: Uuid,
    /// Display name; leave empty to get an auto-generated one.
    #[serde(default)]
    pub name: String,
}

/// Response carrying the id of the joined player.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinResponse {
    pub player_id: Uuid,
}

/// Where the player's session currently is.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerStatusResponse {
    pub phase: SessionPhase,
    pub num_questions: usize,
    /// 1-based current question position (0 before the first question).
    pub at_question: usize,
}

/// Payload submitting the selected answer ids for a question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAnswersRequest {
    pub answer_ids: Vec<Uuid>,
}

/// Payload for sending one chat message.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChatSendRequest {
    /// Message body, 1 to 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub message: String,
}

/// One chat message as shown in the history.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ChatMessageView {
    pub player_id: Uuid,
    pub player_name: String,
    pub message: String,
    /// Unix timestamp in seconds.
    pub sent_at: i64,
}

impl From<&ChatMessage> for ChatMessageView {
    fn from(value: &ChatMessage) -> Self {
        Self {
            player_id: value.player_id,
            player_name: value.player_name.clone(),
            message: value.body.clone(),
            sent_at: value.sent_at,
        }
    }
}

/// Chat history of the player's session, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatHistoryResponse {
    pub messages: Vec<ChatMessageView>,
}
