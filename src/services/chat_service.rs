//! Session-scoped chat. Messages live in the session's append-only log and
//! remain readable in every phase, including after the session ended.

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{
    dto::player::{ChatHistoryResponse, ChatMessageView, ChatSendRequest},
    error::ServiceError,
    state::{SharedState, session::ChatMessage},
};

/// Append a chat message to the player's session log.
pub async fn send(
    state: &SharedState,
    player_id: Uuid,
    request: ChatSendRequest,
) -> Result<(), ServiceError> {
    let handle = state.player_session(player_id)?;
    let mut session = handle.inner.lock().await;

    let player_name = session
        .players
        .get(&player_id)
        .ok_or(ServiceError::InvalidPlayer)?
        .name
        .clone();

    session.chat.push(ChatMessage {
        player_id,
        player_name,
        body: request.message,
        sent_at: OffsetDateTime::now_utc().unix_timestamp(),
    });
    debug!(session_id = %session.id, %player_id, "chat message appended");
    Ok(())
}

/// Chat history of the player's session, newest first.
pub async fn history(
    state: &SharedState,
    player_id: Uuid,
) -> Result<ChatHistoryResponse, ServiceError> {
    let handle = state.player_session(player_id)?;
    let session = handle.inner.lock().await;

    // The log is append-only, so reverse order is newest first.
    let messages = session.chat.iter().rev().map(ChatMessageView::from).collect();
    Ok(ChatHistoryResponse { messages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::{
            admin::{AnswerInput, CreateQuestionRequest, CreateQuizRequest, StartSessionRequest},
            player::JoinRequest,
        },
        services::{player_service, quiz_service, session_service},
        state::AppState,
    };
    use validator::Validate;

    async fn joined_player() -> (SharedState, Uuid) {
        let state = AppState::new(AppConfig::default());
        let owner = Uuid::new_v4();
        let quiz_id = quiz_service::create_quiz(
            &state,
            owner,
            CreateQuizRequest {
                name: "Trivia".into(),
                description: String::new(),
            },
        )
        .unwrap();
        quiz_service::add_question(
            &state,
            owner,
            quiz_id,
            CreateQuestionRequest {
                question: "Anything at all?".into(),
                duration: 10,
                points: 5,
                thumbnail_url: "https://example.com/q.png".into(),
                answers: vec![
                    AnswerInput {
                        answer: "Yes".into(),
                        correct: true,
                    },
                    AnswerInput {
                        answer: "No".into(),
                        correct: false,
                    },
                ],
            },
        )
        .unwrap();
        let session_id = session_service::start_session(
            &state,
            owner,
            quiz_id,
            StartSessionRequest { auto_start_num: 3 },
        )
        .await
        .unwrap();
        let player_id = player_service::join(
            &state,
            JoinRequest {
                session_id,
                name: "alice".into(),
            },
        )
        .await
        .unwrap();
        (state, player_id)
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let (state, player_id) = joined_player().await;

        for body in ["first", "second", "third"] {
            send(
                &state,
                player_id,
                ChatSendRequest {
                    message: body.into(),
                },
            )
            .await
            .unwrap();
        }

        let history = history(&state, player_id).await.unwrap();
        let bodies: Vec<&str> = history.messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(bodies, vec!["third", "second", "first"]);
        assert!(history.messages.iter().all(|m| m.player_name == "alice"));
    }

    #[tokio::test]
    async fn unknown_player_cannot_chat() {
        let (state, _) = joined_player().await;
        let err = send(
            &state,
            Uuid::new_v4(),
            ChatSendRequest {
                message: "hello".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPlayer));
    }

    #[test]
    fn message_length_bounds_are_enforced_by_validation() {
        assert!(
            ChatSendRequest {
                message: String::new()
            }
            .validate()
            .is_err()
        );
        assert!(
            ChatSendRequest {
                message: "a".repeat(101)
            }
            .validate()
            .is_err()
        );
        assert!(
            ChatSendRequest {
                message: "a".repeat(100)
            }
            .validate()
            .is_ok()
        );
    }
}
