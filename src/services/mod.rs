/// Session-scoped chat log.
pub mod chat_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Player-facing operations: joining, answering, results.
pub mod player_service;
/// Quiz and question authoring.
pub mod quiz_service;
/// Session lifecycle, transitions, and delayed-transition timers.
pub mod session_service;
