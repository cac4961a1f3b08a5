use std::collections::HashMap;

use indexmap::IndexMap;
use time::OffsetDateTime;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::state::{
    quiz::{Question, Quiz},
    state_machine::{Phase, SessionStateMachine},
};

/// A player joined to a session.
#[derive(Debug, Clone)]
pub struct Player {
    /// Stable identifier handed back on join.
    pub id: Uuid,
    /// Display name, unique within the session.
    pub name: String,
    /// Running score; one-decimal awards, only ever increased.
    pub score: f64,
}

/// Per-question correctness bookkeeping for one session.
#[derive(Debug, Clone)]
pub struct QuestionRecord {
    /// Question this record belongs to.
    pub question_id: Uuid,
    /// Names of fully correct responders in arrival order.
    pub players_correct: Vec<String>,
    /// Always 0: answer-time tracking is not wired up.
    pub average_answer_time: f64,
    /// Always 0: attempt counting is not wired up.
    pub percent_correct: f64,
}

impl QuestionRecord {
    fn new(question_id: Uuid) -> Self {
        Self {
            question_id,
            players_correct: Vec::new(),
            average_answer_time: 0.0,
            percent_correct: 0.0,
        }
    }
}

/// One chat message in a session's append-only log.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Author of the message.
    pub player_id: Uuid,
    /// Author's display name at send time.
    pub player_name: String,
    /// Message body (1 to 100 characters).
    pub body: String,
    /// Unix timestamp in seconds.
    pub sent_at: i64,
}

/// Which delayed transition a pending timer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fixed delay before the question opens.
    Countdown,
    /// The open question's duration.
    QuestionDuration,
}

/// Handle to the single outstanding delayed transition of a session.
#[derive(Debug)]
pub struct PendingTimer {
    /// Which transition this timer drives when it fires.
    pub kind: TimerKind,
    /// Epoch the timer was armed under; stale epochs are ignored on fire.
    pub epoch: u64,
    /// Abort handle for the sleeping task.
    pub handle: AbortHandle,
}

/// One live (or ended) playthrough of a quiz.
///
/// All mutable session state lives here and is only ever touched while the
/// owning `tokio::sync::Mutex` is held, which serialises administrator
/// commands, player submissions, and timer callbacks against each other.
#[derive(Debug)]
pub struct Session {
    /// Stable identifier for the session.
    pub id: Uuid,
    /// Identity of the administrator owning the quiz.
    pub owner_id: Uuid,
    /// Immutable copy of the quiz taken at start time.
    pub quiz: Quiz,
    /// Phase machine and question pointer.
    pub machine: SessionStateMachine,
    /// Players in join order, keyed by id.
    pub players: IndexMap<Uuid, Player>,
    /// One record per question, in quiz order.
    pub ledger: Vec<QuestionRecord>,
    /// Latest raw submission per player per 1-based question position.
    pub submissions: HashMap<(Uuid, usize), Vec<Uuid>>,
    /// Append-only chat log.
    pub chat: Vec<ChatMessage>,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
    pending_timer: Option<PendingTimer>,
    timer_epoch: u64,
}

impl Session {
    /// Start a new session in the lobby, snapshotting the quiz.
    pub fn new(quiz: Quiz) -> Self {
        let ledger = quiz
            .questions
            .iter()
            .map(|q| QuestionRecord::new(q.id))
            .collect();
        Self {
            id: Uuid::new_v4(),
            owner_id: quiz.owner_id,
            quiz,
            machine: SessionStateMachine::new(),
            players: IndexMap::new(),
            ledger,
            submissions: HashMap::new(),
            chat: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
            pending_timer: None,
            timer_epoch: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// 1-based position of the current question (0 in lobby).
    pub fn at_question(&self) -> usize {
        self.machine.at_question()
    }

    /// Number of questions in the snapshot.
    pub fn total_questions(&self) -> usize {
        self.quiz.questions.len()
    }

    /// Question at a 1-based position.
    pub fn question_at(&self, position: usize) -> Option<&Question> {
        position
            .checked_sub(1)
            .and_then(|idx| self.quiz.questions.get(idx))
    }

    /// Ledger record at a 1-based position.
    pub fn record_at_mut(&mut self, position: usize) -> Option<&mut QuestionRecord> {
        position
            .checked_sub(1)
            .and_then(|idx| self.ledger.get_mut(idx))
    }

    /// Whether a delayed transition is currently armed.
    pub fn has_pending_timer(&self) -> bool {
        self.pending_timer.is_some()
    }

    /// Cancel any pending timer and invalidate its epoch.
    ///
    /// Returns the new epoch, which the caller uses when arming a
    /// replacement so that an aborted-but-already-woken task observes a
    /// mismatch and backs off.
    pub fn disarm_timer(&mut self) -> u64 {
        self.timer_epoch += 1;
        if let Some(timer) = self.pending_timer.take() {
            timer.handle.abort();
        }
        self.timer_epoch
    }

    /// Record the newly armed timer. Any previous timer must already have
    /// been cancelled through [`Session::disarm_timer`].
    pub fn arm_timer(&mut self, timer: PendingTimer) {
        debug_assert!(self.pending_timer.is_none());
        self.pending_timer = Some(timer);
    }

    /// Consume the pending timer if it matches the firing callback.
    ///
    /// Returns `true` when the callback is current and may advance the
    /// session; `false` means the timer was superseded and the callback must
    /// be a no-op.
    pub fn take_fired_timer(&mut self, kind: TimerKind, epoch: u64) -> bool {
        match &self.pending_timer {
            Some(timer) if timer.kind == kind && timer.epoch == epoch => {
                self.pending_timer = None;
                true
            }
            _ => false,
        }
    }
}
