pub mod quiz;
pub mod session;
pub mod state_machine;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::ServiceError,
    state::{quiz::Quiz, session::Session},
};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Entry in the session map carrying the keys needed for routing checks
/// without locking the session itself.
#[derive(Clone)]
pub struct SessionHandle {
    /// Quiz this session was started from.
    pub quiz_id: Uuid,
    /// Administrator owning that quiz at start time.
    pub owner_id: Uuid,
    /// The session state, serialised behind its own lock.
    pub inner: Arc<Mutex<Session>>,
}

/// Central application state owned by a single service instance.
///
/// Every operation receives this object and mutates through its methods.
/// Cross-session operations are independent; each session serialises its own
/// mutations behind a per-session mutex.
pub struct AppState {
    config: AppConfig,
    quizzes: DashMap<Uuid, Quiz>,
    sessions: DashMap<Uuid, SessionHandle>,
    // player id -> session id, so player-facing calls skip a session scan.
    players: DashMap<Uuid, Uuid>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config,
            quizzes: DashMap::new(),
            sessions: DashMap::new(),
            players: DashMap::new(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Quiz catalog keyed by quiz id.
    pub fn quizzes(&self) -> &DashMap<Uuid, Quiz> {
        &self.quizzes
    }

    /// Register a freshly started session.
    pub fn insert_session(&self, session: Session) -> Uuid {
        let id = session.id;
        let handle = SessionHandle {
            quiz_id: session.quiz.id,
            owner_id: session.owner_id,
            inner: Arc::new(Mutex::new(session)),
        };
        self.sessions.insert(id, handle);
        id
    }

    /// Look up a session by id.
    pub fn session(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.get(&id).map(|entry| entry.clone())
    }

    /// Look up a session that must belong to the given quiz.
    pub fn session_in_quiz(&self, quiz_id: Uuid, id: Uuid) -> Result<SessionHandle, ServiceError> {
        self.session(id)
            .filter(|handle| handle.quiz_id == quiz_id)
            .ok_or(ServiceError::InvalidSession)
    }

    /// All sessions started from the given quiz.
    pub fn sessions_for_quiz(&self, quiz_id: Uuid) -> Vec<(Uuid, SessionHandle)> {
        self.sessions
            .iter()
            .filter(|entry| entry.value().quiz_id == quiz_id)
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Number of registered sessions, ended ones included.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Remember which session a player belongs to.
    pub fn index_player(&self, player_id: Uuid, session_id: Uuid) {
        self.players.insert(player_id, session_id);
    }

    /// Resolve a player id to its session.
    pub fn player_session(&self, player_id: Uuid) -> Result<SessionHandle, ServiceError> {
        let session_id = self
            .players
            .get(&player_id)
            .map(|entry| *entry.value())
            .ok_or(ServiceError::InvalidPlayer)?;
        self.session(session_id).ok_or(ServiceError::InvalidPlayer)
    }

    /// Discard all quizzes, sessions, and players, cancelling every pending
    /// session timer first so no stale callback can fire after the reset.
    pub async fn clear(&self) {
        // Collect handles first so no map shard stays locked across an await.
        let handles: Vec<SessionHandle> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for handle in handles {
            let mut session = handle.inner.lock().await;
            session.disarm_timer();
        }
        self.sessions.clear();
        self.players.clear();
        self.quizzes.clear();
    }
}
