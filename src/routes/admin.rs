use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        admin::{
            ActionResponse, CreateQuestionRequest, CreateQuestionResponse, CreateQuizRequest,
            CreateQuizResponse, SessionListResponse, SessionStatusResponse, StartSessionRequest,
            StartSessionResponse, TransitionRequest,
        },
        common::SessionResultsResponse,
        phase::SessionPhase,
    },
    error::AppError,
    routes::identity::AdminIdentity,
    services::{quiz_service, session_service},
    state::SharedState,
};

/// Admin endpoints for building quizzes and driving their sessions.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/admin/quizzes", post(create_quiz))
        .route("/admin/quizzes/{quiz_id}/questions", post(create_question))
        .route(
            "/admin/quizzes/{quiz_id}/sessions",
            get(view_sessions).post(start_session),
        )
        .route(
            "/admin/quizzes/{quiz_id}/sessions/{session_id}",
            put(transition_session).get(session_status),
        )
        .route(
            "/admin/quizzes/{quiz_id}/sessions/{session_id}/results",
            get(session_results),
        )
        .route("/admin/reset", delete(reset))
}

/// Register a new quiz owned by the calling administrator.
#[utoipa::path(
    post,
    path = "/admin/quizzes",
    tag = "admin",
    params(("X-Admin-Id" = String, Header, description = "Opaque administrator identity")),
    request_body = CreateQuizRequest,
    responses((status = 200, description = "Quiz created", body = CreateQuizResponse))
)]
pub async fn create_quiz(
    State(state): State<SharedState>,
    AdminIdentity(owner_id): AdminIdentity,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<Json<CreateQuizResponse>, AppError> {
    payload.validate()?;
    let quiz_id = quiz_service::create_quiz(&state, owner_id, payload)?;
    Ok(Json(CreateQuizResponse { quiz_id }))
}

/// Append a question to an owned quiz.
#[utoipa::path(
    post,
    path = "/admin/quizzes/{quiz_id}/questions",
    tag = "admin",
    params(
        ("X-Admin-Id" = String, Header, description = "Opaque administrator identity"),
        ("quiz_id" = Uuid, Path, description = "Quiz to append the question to")
    ),
    request_body = CreateQuestionRequest,
    responses((status = 200, description = "Question created", body = CreateQuestionResponse))
)]
pub async fn create_question(
    State(state): State<SharedState>,
    AdminIdentity(owner_id): AdminIdentity,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<Json<CreateQuestionResponse>, AppError> {
    let question_id = quiz_service::add_question(&state, owner_id, quiz_id, payload)?;
    Ok(Json(CreateQuestionResponse { question_id }))
}

/// Start a new session of an owned quiz, initially in the lobby.
#[utoipa::path(
    post,
    path = "/admin/quizzes/{quiz_id}/sessions",
    tag = "admin",
    params(
        ("X-Admin-Id" = String, Header, description = "Opaque administrator identity"),
        ("quiz_id" = Uuid, Path, description = "Quiz to start a session of")
    ),
    request_body = StartSessionRequest,
    responses((status = 200, description = "Session started", body = StartSessionResponse))
)]
pub async fn start_session(
    State(state): State<SharedState>,
    AdminIdentity(owner_id): AdminIdentity,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, AppError> {
    let session_id = session_service::start_session(&state, owner_id, quiz_id, payload).await?;
    Ok(Json(StartSessionResponse { session_id }))
}

/// List an owned quiz's sessions, split into active and ended.
#[utoipa::path(
    get,
    path = "/admin/quizzes/{quiz_id}/sessions",
    tag = "admin",
    params(
        ("X-Admin-Id" = String, Header, description = "Opaque administrator identity"),
        ("quiz_id" = Uuid, Path, description = "Quiz whose sessions to list")
    ),
    responses((status = 200, description = "Session ids by liveness", body = SessionListResponse))
)]
pub async fn view_sessions(
    State(state): State<SharedState>,
    AdminIdentity(owner_id): AdminIdentity,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<SessionListResponse>, AppError> {
    Ok(Json(
        session_service::view_sessions(&state, owner_id, quiz_id).await?,
    ))
}

/// Apply a lifecycle action to a session of an owned quiz.
#[utoipa::path(
    put,
    path = "/admin/quizzes/{quiz_id}/sessions/{session_id}",
    tag = "admin",
    params(
        ("X-Admin-Id" = String, Header, description = "Opaque administrator identity"),
        ("quiz_id" = Uuid, Path, description = "Quiz the session belongs to"),
        ("session_id" = Uuid, Path, description = "Session to transition")
    ),
    request_body = TransitionRequest,
    responses((status = 200, description = "Action applied", body = ActionResponse))
)]
pub async fn transition_session(
    State(state): State<SharedState>,
    AdminIdentity(owner_id): AdminIdentity,
    Path((quiz_id, session_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let next =
        session_service::transition(&state, owner_id, quiz_id, session_id, &payload.action).await?;
    let phase = serde_json::to_value(SessionPhase::from(next))
        .map_err(|err| AppError::Internal(err.to_string()))?;
    Ok(Json(ActionResponse {
        message: format!(
            "session is now in phase {}",
            phase.as_str().unwrap_or_default()
        ),
    }))
}

/// Full status of one session of an owned quiz.
#[utoipa::path(
    get,
    path = "/admin/quizzes/{quiz_id}/sessions/{session_id}",
    tag = "admin",
    params(
        ("X-Admin-Id" = String, Header, description = "Opaque administrator identity"),
        ("quiz_id" = Uuid, Path, description = "Quiz the session belongs to"),
        ("session_id" = Uuid, Path, description = "Session to inspect")
    ),
    responses((status = 200, description = "Session status", body = SessionStatusResponse))
)]
pub async fn session_status(
    State(state): State<SharedState>,
    AdminIdentity(owner_id): AdminIdentity,
    Path((quiz_id, session_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SessionStatusResponse>, AppError> {
    Ok(Json(
        session_service::session_status(&state, owner_id, quiz_id, session_id).await?,
    ))
}

/// Final results of a session that reached its leaderboard.
#[utoipa::path(
    get,
    path = "/admin/quizzes/{quiz_id}/sessions/{session_id}/results",
    tag = "admin",
    params(
        ("X-Admin-Id" = String, Header, description = "Opaque administrator identity"),
        ("quiz_id" = Uuid, Path, description = "Quiz the session belongs to"),
        ("session_id" = Uuid, Path, description = "Session to read results of")
    ),
    responses((status = 200, description = "Final results", body = SessionResultsResponse))
)]
pub async fn session_results(
    State(state): State<SharedState>,
    AdminIdentity(owner_id): AdminIdentity,
    Path((quiz_id, session_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SessionResultsResponse>, AppError> {
    Ok(Json(
        session_service::session_results(&state, owner_id, quiz_id, session_id).await?,
    ))
}

/// Wipe all quizzes, sessions, and players. Intended for test harnesses.
#[utoipa::path(
    delete,
    path = "/admin/reset",
    tag = "admin",
    responses((status = 204, description = "State wiped"))
)]
pub async fn reset(State(state): State<SharedState>) -> StatusCode {
    session_service::reset(&state).await;
    StatusCode::NO_CONTENT
}
