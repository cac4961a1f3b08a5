use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        common::{QuestionResultView, QuestionView, SessionResultsResponse},
        player::{
            ChatHistoryResponse, ChatSendRequest, JoinRequest, JoinResponse, PlayerStatusResponse,
            SubmitAnswersRequest,
        },
    },
    error::AppError,
    services::{chat_service, player_service},
    state::SharedState,
};

/// Player endpoints: joining, answering, results, and chat.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/player/join", post(join))
        .route("/player/{player_id}", get(status))
        .route("/player/{player_id}/question/{position}", get(question_info))
        .route(
            "/player/{player_id}/question/{position}/answer",
            put(submit_answers),
        )
        .route(
            "/player/{player_id}/question/{position}/results",
            get(question_results),
        )
        .route("/player/{player_id}/results", get(final_results))
        .route(
            "/player/{player_id}/chat",
            get(chat_history).post(chat_send),
        )
}

/// Join a session that is still in its lobby.
#[utoipa::path(
    post,
    path = "/player/join",
    tag = "player",
    request_body = JoinRequest,
    responses((status = 200, description = "Joined", body = JoinResponse))
)]
pub async fn join(
    State(state): State<SharedState>,
    Json(payload): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, AppError> {
    let player_id = player_service::join(&state, payload).await?;
    Ok(Json(JoinResponse { player_id }))
}

/// Where the player's session currently is.
#[utoipa::path(
    get,
    path = "/player/{player_id}",
    tag = "player",
    params(("player_id" = Uuid, Path, description = "Player identity issued on join")),
    responses((status = 200, description = "Player status", body = PlayerStatusResponse))
)]
pub async fn status(
    State(state): State<SharedState>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<PlayerStatusResponse>, AppError> {
    Ok(Json(player_service::status(&state, player_id).await?))
}

/// The current question, stripped of correctness flags.
#[utoipa::path(
    get,
    path = "/player/{player_id}/question/{position}",
    tag = "player",
    params(
        ("player_id" = Uuid, Path, description = "Player identity issued on join"),
        ("position" = usize, Path, description = "1-based question position")
    ),
    responses((status = 200, description = "Question", body = QuestionView))
)]
pub async fn question_info(
    State(state): State<SharedState>,
    Path((player_id, position)): Path<(Uuid, usize)>,
) -> Result<Json<QuestionView>, AppError> {
    Ok(Json(
        player_service::question_info(&state, player_id, position).await?,
    ))
}

/// Submit the selected answer ids for the open question.
#[utoipa::path(
    put,
    path = "/player/{player_id}/question/{position}/answer",
    tag = "player",
    params(
        ("player_id" = Uuid, Path, description = "Player identity issued on join"),
        ("position" = usize, Path, description = "1-based question position")
    ),
    request_body = SubmitAnswersRequest,
    responses((status = 204, description = "Submission recorded"))
)]
pub async fn submit_answers(
    State(state): State<SharedState>,
    Path((player_id, position)): Path<(Uuid, usize)>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<StatusCode, AppError> {
    player_service::submit_answers(&state, player_id, position, payload.answer_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Aggregated result of a question while its answers are shown.
#[utoipa::path(
    get,
    path = "/player/{player_id}/question/{position}/results",
    tag = "player",
    params(
        ("player_id" = Uuid, Path, description = "Player identity issued on join"),
        ("position" = usize, Path, description = "1-based question position")
    ),
    responses((status = 200, description = "Question result", body = QuestionResultView))
)]
pub async fn question_results(
    State(state): State<SharedState>,
    Path((player_id, position)): Path<(Uuid, usize)>,
) -> Result<Json<QuestionResultView>, AppError> {
    Ok(Json(
        player_service::question_results(&state, player_id, position).await?,
    ))
}

/// Final session results once the leaderboard is reached.
#[utoipa::path(
    get,
    path = "/player/{player_id}/results",
    tag = "player",
    params(("player_id" = Uuid, Path, description = "Player identity issued on join")),
    responses((status = 200, description = "Final results", body = SessionResultsResponse))
)]
pub async fn final_results(
    State(state): State<SharedState>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<SessionResultsResponse>, AppError> {
    Ok(Json(player_service::final_results(&state, player_id).await?))
}

/// Send one chat message to the player's session.
#[utoipa::path(
    post,
    path = "/player/{player_id}/chat",
    tag = "player",
    params(("player_id" = Uuid, Path, description = "Player identity issued on join")),
    request_body = ChatSendRequest,
    responses((status = 204, description = "Message sent"))
)]
pub async fn chat_send(
    State(state): State<SharedState>,
    Path(player_id): Path<Uuid>,
    Json(payload): Json<ChatSendRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    chat_service::send(&state, player_id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Chat history of the player's session, newest first.
#[utoipa::path(
    get,
    path = "/player/{player_id}/chat",
    tag = "player",
    params(("player_id" = Uuid, Path, description = "Player identity issued on join")),
    responses((status = 200, description = "Chat history", body = ChatHistoryResponse))
)]
pub async fn chat_history(
    State(state): State<SharedState>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<ChatHistoryResponse>, AppError> {
    Ok(Json(chat_service::history(&state, player_id).await?))
}
