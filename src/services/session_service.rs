//! Session lifecycle: starting sessions from a quiz, driving phase
//! transitions on behalf of the administrator, and running the delayed
//! transitions (countdown expiry, question expiry) behind them.
//!
//! Every timer is armed and consumed under the session lock. A fired timer
//! task re-acquires the lock and checks its epoch before touching the phase,
//! so a cancellation that raced with the wakeup degrades into a no-op.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{SessionListResponse, SessionStatusResponse, StartSessionRequest},
        common::{QuestionResultView, QuizMetadata, RankedPlayer, SessionResultsResponse},
    },
    error::ServiceError,
    services::quiz_service,
    state::{
        SharedState,
        session::{PendingTimer, Session, TimerKind},
        state_machine::{Action, Phase, TimerCommand},
    },
};

/// Range accepted for the auto-start threshold. The value is validated and
/// stored nowhere: lobby auto-start never shipped.
const AUTO_START_RANGE: std::ops::RangeInclusive<u32> = 1..=50;

/// Start a new session of the given quiz, initially in the lobby.
pub async fn start_session(
    state: &SharedState,
    owner_id: Uuid,
    quiz_id: Uuid,
    request: StartSessionRequest,
) -> Result<Uuid, ServiceError> {
    if !AUTO_START_RANGE.contains(&request.auto_start_num) {
        return Err(ServiceError::InvalidInput(
            "auto start number must be between 1 and 50".into(),
        ));
    }

    let quiz = quiz_service::owned_quiz(state, owner_id, quiz_id)?;
    if quiz.questions.is_empty() {
        return Err(ServiceError::InvalidInput(
            "cannot start a session of a quiz with no questions".into(),
        ));
    }

    let mut open = 0usize;
    for (_, handle) in state.sessions_for_quiz(quiz_id) {
        let session = handle.inner.lock().await;
        if session.phase() != Phase::End {
            open += 1;
        }
    }
    if open >= state.config().max_open_sessions {
        return Err(ServiceError::InvalidInput(format!(
            "a quiz cannot have more than {} sessions that are not in the end phase",
            state.config().max_open_sessions
        )));
    }

    let session_id = state.insert_session(Session::new(quiz));
    debug!(%quiz_id, %session_id, "session started");
    Ok(session_id)
}

/// Apply an administrator action to a session of an owned quiz.
///
/// Returns the phase the session ended up in.
pub async fn transition(
    state: &SharedState,
    owner_id: Uuid,
    quiz_id: Uuid,
    session_id: Uuid,
    action: &str,
) -> Result<Phase, ServiceError> {
    quiz_service::require_owner(state, owner_id, quiz_id)?;
    let handle = state.session_in_quiz(quiz_id, session_id)?;
    let action: Action = action.parse()?;

    let mut session = handle.inner.lock().await;
    let total = session.total_questions();
    let transition = session.machine.apply(action, total)?;

    match transition.timer {
        TimerCommand::ScheduleCountdown => schedule_countdown(state, &mut session),
        TimerCommand::ScheduleQuestion => schedule_question(state, &mut session),
        TimerCommand::Cancel => {
            session.disarm_timer();
        }
    }

    debug!(%session_id, ?action, next = ?transition.next, "session transitioned");
    Ok(transition.next)
}

/// List a quiz's sessions, split into those still playing and those ended.
pub async fn view_sessions(
    state: &SharedState,
    owner_id: Uuid,
    quiz_id: Uuid,
) -> Result<SessionListResponse, ServiceError> {
    quiz_service::require_owner(state, owner_id, quiz_id)?;

    let mut active_sessions = Vec::new();
    let mut inactive_sessions = Vec::new();
    for (id, handle) in state.sessions_for_quiz(quiz_id) {
        let session = handle.inner.lock().await;
        if session.phase() == Phase::End {
            inactive_sessions.push(id);
        } else {
            active_sessions.push(id);
        }
    }
    active_sessions.sort();
    inactive_sessions.sort();

    Ok(SessionListResponse {
        active_sessions,
        inactive_sessions,
    })
}

/// Full status of one session, including the quiz snapshot it plays.
pub async fn session_status(
    state: &SharedState,
    owner_id: Uuid,
    quiz_id: Uuid,
    session_id: Uuid,
) -> Result<SessionStatusResponse, ServiceError> {
    quiz_service::require_owner(state, owner_id, quiz_id)?;
    let handle = state.session_in_quiz(quiz_id, session_id)?;

    let session = handle.inner.lock().await;
    Ok(SessionStatusResponse {
        phase: session.phase().into(),
        at_question: session.at_question(),
        players: session.players.values().map(|p| p.name.clone()).collect(),
        metadata: QuizMetadata::from(&session.quiz),
    })
}

/// Final results of a session, available once it reached the leaderboard.
pub async fn session_results(
    state: &SharedState,
    owner_id: Uuid,
    quiz_id: Uuid,
    session_id: Uuid,
) -> Result<SessionResultsResponse, ServiceError> {
    quiz_service::require_owner(state, owner_id, quiz_id)?;
    let handle = state.session_in_quiz(quiz_id, session_id)?;

    let session = handle.inner.lock().await;
    if session.phase() != Phase::FinalResults {
        return Err(ServiceError::WrongPhase(session.phase()));
    }
    Ok(results_payload(&session))
}

/// Wipe all quizzes, sessions, and players.
pub async fn reset(state: &SharedState) {
    state.clear().await;
    debug!("application state reset");
}

/// Build the results payload shared by the admin and player surfaces.
///
/// Players are ranked by descending score; the sort is stable, so ties keep
/// join order.
pub(crate) fn results_payload(session: &Session) -> SessionResultsResponse {
    let mut users_ranked_by_score: Vec<RankedPlayer> =
        session.players.values().map(RankedPlayer::from).collect();
    users_ranked_by_score.sort_by(|a, b| b.score.total_cmp(&a.score));

    SessionResultsResponse {
        users_ranked_by_score,
        question_results: session.ledger.iter().map(QuestionResultView::from).collect(),
    }
}

/// Arm the pre-question countdown, superseding any pending timer.
fn schedule_countdown(state: &SharedState, session: &mut Session) {
    let epoch = session.disarm_timer();
    let session_id = session.id;
    let delay = state.config().countdown;
    let state = Arc::clone(state);
    let handle = tokio::spawn(async move {
        sleep(delay).await;
        countdown_fired(state, session_id, epoch).await;
    })
    .abort_handle();
    session.arm_timer(PendingTimer {
        kind: TimerKind::Countdown,
        epoch,
        handle,
    });
}

/// Arm the current question's duration, superseding any pending timer.
fn schedule_question(state: &SharedState, session: &mut Session) {
    let epoch = session.disarm_timer();
    let session_id = session.id;
    let Some(question) = session.question_at(session.at_question()) else {
        warn!(%session_id, at_question = session.at_question(), "no question at pointer; not arming duration timer");
        return;
    };
    let delay = Duration::from_secs(u64::from(question.duration_secs));
    let state = Arc::clone(state);
    let handle = tokio::spawn(async move {
        sleep(delay).await;
        question_fired(state, session_id, epoch).await;
    })
    .abort_handle();
    session.arm_timer(PendingTimer {
        kind: TimerKind::QuestionDuration,
        epoch,
        handle,
    });
}

async fn countdown_fired(state: SharedState, session_id: Uuid, epoch: u64) {
    let Some(handle) = state.session(session_id) else {
        return;
    };
    let mut session = handle.inner.lock().await;
    if !session.take_fired_timer(TimerKind::Countdown, epoch) {
        debug!(%session_id, epoch, "stale countdown timer ignored");
        return;
    }
    if session.machine.countdown_elapsed() {
        debug!(%session_id, at_question = session.at_question(), "countdown elapsed; question open");
        schedule_question(&state, &mut session);
    }
}

async fn question_fired(state: SharedState, session_id: Uuid, epoch: u64) {
    let Some(handle) = state.session(session_id) else {
        return;
    };
    let mut session = handle.inner.lock().await;
    if !session.take_fired_timer(TimerKind::QuestionDuration, epoch) {
        debug!(%session_id, epoch, "stale question timer ignored");
        return;
    }
    if session.machine.question_elapsed() {
        debug!(%session_id, at_question = session.at_question(), "question duration elapsed; submissions closed");
    }
}
