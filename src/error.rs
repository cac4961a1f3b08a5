use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::state::state_machine::{InvalidAction, InvalidTransition, Phase};

/// Domain errors surfaced by the service layer.
///
/// Every variant is a request-scoped validation failure: surfaced
/// synchronously to the caller, never retried, never recoverable internally.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Session id unknown, or not part of the named quiz.
    #[error("session does not refer to a valid session within this quiz")]
    InvalidSession,
    /// Player id unknown.
    #[error("player not found")]
    InvalidPlayer,
    /// 1-based question position outside the quiz.
    #[error("question position {0} is not valid for this session")]
    InvalidPosition(usize),
    /// Submitted answer id does not belong to the question.
    #[error("answer id `{0}` is not valid for this question")]
    InvalidAnswerId(Uuid),
    /// The same answer id was submitted more than once.
    #[error("duplicate answer ids submitted")]
    DuplicateAnswerId,
    /// No answer ids were submitted.
    #[error("at least one answer id must be submitted")]
    EmptySubmission,
    /// Operation not allowed in the session's current phase.
    #[error("operation is not allowed while the session is in {0:?}")]
    WrongPhase(Phase),
    /// The session has not advanced to the requested question.
    #[error("session is not up to this question yet")]
    NotYetOnQuestion,
    /// Phase transition rejected by the state machine.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// Action string does not name a known action.
    #[error(transparent)]
    InvalidAction(#[from] InvalidAction),
    /// Player display name already taken within the session.
    #[error("name `{0}` is already used by another player in this session")]
    DuplicateName(String),
    /// Caller does not own the quiz.
    #[error("caller does not own this quiz")]
    Forbidden,
    /// Missing or malformed caller identity.
    #[error("missing or invalid admin identity")]
    Unauthenticated,
    /// Request payload failed a domain validation rule.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ServiceError {
    /// Stable machine-readable kind, independent of the human message.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidSession => "INVALID_SESSION",
            ServiceError::InvalidPlayer => "INVALID_PLAYER",
            ServiceError::InvalidPosition(_) => "INVALID_POSITION",
            ServiceError::InvalidAnswerId(_) => "INVALID_ANSWER_ID",
            ServiceError::DuplicateAnswerId => "DUPLICATE_ANSWER_ID",
            ServiceError::EmptySubmission => "EMPTY_SUBMISSION",
            ServiceError::WrongPhase(_) => "WRONG_PHASE",
            ServiceError::NotYetOnQuestion => "NOT_YET_ON_QUESTION",
            ServiceError::InvalidTransition(_) => "INVALID_TRANSITION",
            ServiceError::InvalidAction(_) => "INVALID_ACTION",
            ServiceError::DuplicateName(_) => "DUPLICATE_NAME",
            ServiceError::Forbidden => "FORBIDDEN",
            ServiceError::Unauthenticated => "UNAUTHENTICATED",
            ServiceError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Missing or invalid identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated caller lacks rights over the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {err}"))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let kind = err.kind();
        match err {
            ServiceError::Unauthenticated => AppError::Unauthorized(err.to_string()),
            ServiceError::Forbidden => AppError::Forbidden(err.to_string()),
            other => AppError::BadRequest(format!("{kind}: {other}")),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
