use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Hotseat Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::admin::create_quiz,
        crate::routes::admin::create_question,
        crate::routes::admin::start_session,
        crate::routes::admin::view_sessions,
        crate::routes::admin::transition_session,
        crate::routes::admin::session_status,
        crate::routes::admin::session_results,
        crate::routes::admin::reset,
        crate::routes::player::join,
        crate::routes::player::status,
        crate::routes::player::question_info,
        crate::routes::player::submit_answers,
        crate::routes::player::question_results,
        crate::routes::player::final_results,
        crate::routes::player::chat_send,
        crate::routes::player::chat_history,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::phase::SessionPhase,
            crate::dto::admin::CreateQuizRequest,
            crate::dto::admin::CreateQuizResponse,
            crate::dto::admin::AnswerInput,
            crate::dto::admin::CreateQuestionRequest,
            crate::dto::admin::CreateQuestionResponse,
            crate::dto::admin::StartSessionRequest,
            crate::dto::admin::StartSessionResponse,
            crate::dto::admin::TransitionRequest,
            crate::dto::admin::ActionResponse,
            crate::dto::admin::SessionListResponse,
            crate::dto::admin::SessionStatusResponse,
            crate::dto::common::AnswerView,
            crate::dto::common::QuestionView,
            crate::dto::common::AnswerSnapshot,
            crate::dto::common::QuestionSnapshot,
            crate::dto::common::QuizMetadata,
            crate::dto::common::QuestionResultView,
            crate::dto::common::RankedPlayer,
            crate::dto::common::SessionResultsResponse,
            crate::dto::player::JoinRequest,
            crate::dto::player::JoinResponse,
            crate::dto::player::PlayerStatusResponse,
            crate::dto::player::SubmitAnswersRequest,
            crate::dto::player::ChatSendRequest,
            crate::dto::player::ChatMessageView,
            crate::dto::player::ChatHistoryResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "admin", description = "Quiz authoring and session control"),
        (name = "player", description = "Joining, answering, results, and chat"),
    )
)]
pub struct ApiDoc;
