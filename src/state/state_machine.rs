use std::str::FromStr;

use thiserror::Error;

/// Lifecycle phase of a quiz session.
///
/// Sessions move strictly forward through these phases; `End` is terminal and
/// reachable from every other phase through the explicit end action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Players can join; no question has been shown yet.
    Lobby,
    /// Fixed countdown running before the current question opens.
    QuestionCountdown,
    /// The current question accepts answer submissions.
    QuestionOpen,
    /// The current question's timer elapsed; submissions are closed.
    QuestionClose,
    /// Correct answers for the current question are being revealed.
    AnswerShow,
    /// Final leaderboard is available.
    FinalResults,
    /// Session is over; only historical reads remain possible.
    End,
}

/// Administrator-issued commands that drive a session through its phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Advance to the next question and start its countdown.
    NextQuestion,
    /// Cancel the running countdown and open the question immediately.
    SkipCountdown,
    /// Stop accepting answers and reveal the correct ones.
    GoToAnswer,
    /// Jump to the final leaderboard.
    GoToFinalResults,
    /// Terminate the session from any non-terminal phase.
    End,
}

/// Error returned when an action string does not name a known [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a valid session action")]
pub struct InvalidAction(pub String);

impl FromStr for Action {
    type Err = InvalidAction;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "NEXT_QUESTION" => Ok(Action::NextQuestion),
            "SKIP_COUNTDOWN" => Ok(Action::SkipCountdown),
            "GO_TO_ANSWER" => Ok(Action::GoToAnswer),
            "GO_TO_FINAL_RESULTS" => Ok(Action::GoToFinalResults),
            "END" => Ok(Action::End),
            other => Err(InvalidAction(other.to_owned())),
        }
    }
}

/// Error returned when attempting to apply an action from the wrong phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("action {action:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the session was in when the action was received.
    pub from: Phase,
    /// The action that cannot be applied from this phase.
    pub action: Action,
}

/// Timer side effect the caller must execute after a successful transition.
///
/// The state machine itself never touches timers; it only describes what the
/// owning session must do, so that timer cancellation and the phase write it
/// guards happen atomically under the session lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Cancel any pending timer and schedule the question countdown.
    ScheduleCountdown,
    /// Cancel any pending timer and schedule the current question's duration.
    ScheduleQuestion,
    /// Cancel any pending timer without scheduling a new one.
    Cancel,
}

/// Outcome of a successfully applied action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Phase the session is now in.
    pub next: Phase,
    /// Timer work the session must perform.
    pub timer: TimerCommand,
}

/// Per-session state machine driving the quiz lifecycle.
///
/// Holds the phase and the 1-based pointer to the question currently being
/// played (`0` while still in the lobby). Timer expiry is fed back through
/// [`SessionStateMachine::countdown_elapsed`] and
/// [`SessionStateMachine::question_elapsed`], which no-op when the phase has
/// already moved on so that a stale callback can never corrupt state.
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    phase: Phase,
    at_question: usize,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self {
            phase: Phase::Lobby,
            at_question: 0,
        }
    }
}

impl SessionStateMachine {
    /// Create a state machine initialised in the lobby.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 1-based position of the question currently being played (0 in lobby).
    pub fn at_question(&self) -> usize {
        self.at_question
    }

    /// Apply an administrator action, returning the transition to execute.
    ///
    /// `total_questions` bounds the question pointer: advancing past the last
    /// question is rejected the same way as any other inapplicable action.
    pub fn apply(
        &mut self,
        action: Action,
        total_questions: usize,
    ) -> Result<Transition, InvalidTransition> {
        let transition = match (self.phase, action) {
            (Phase::Lobby | Phase::QuestionClose | Phase::AnswerShow, Action::NextQuestion) => {
                if self.at_question >= total_questions {
                    return Err(InvalidTransition {
                        from: self.phase,
                        action,
                    });
                }
                self.at_question += 1;
                Transition {
                    next: Phase::QuestionCountdown,
                    timer: TimerCommand::ScheduleCountdown,
                }
            }
            (Phase::QuestionCountdown, Action::SkipCountdown) => Transition {
                next: Phase::QuestionOpen,
                timer: TimerCommand::ScheduleQuestion,
            },
            (Phase::QuestionOpen | Phase::QuestionClose, Action::GoToAnswer) => Transition {
                next: Phase::AnswerShow,
                timer: TimerCommand::Cancel,
            },
            (Phase::QuestionClose | Phase::AnswerShow, Action::GoToFinalResults) => Transition {
                next: Phase::FinalResults,
                timer: TimerCommand::Cancel,
            },
            // End is terminal: not even another End is accepted.
            (Phase::End, _) => {
                return Err(InvalidTransition {
                    from: self.phase,
                    action,
                });
            }
            (_, Action::End) => Transition {
                next: Phase::End,
                timer: TimerCommand::Cancel,
            },
            (from, action) => return Err(InvalidTransition { from, action }),
        };

        self.phase = transition.next;
        Ok(transition)
    }

    /// Countdown timer fired: open the question.
    ///
    /// Returns `false` when the phase already moved on (stale timer), in which
    /// case the caller must not schedule the question-duration timer.
    pub fn countdown_elapsed(&mut self) -> bool {
        if self.phase == Phase::QuestionCountdown {
            self.phase = Phase::QuestionOpen;
            true
        } else {
            false
        }
    }

    /// Question-duration timer fired: close submissions.
    ///
    /// Returns `false` when the phase already moved on (stale timer).
    pub fn question_elapsed(&mut self) -> bool {
        if self.phase == Phase::QuestionOpen {
            self.phase = Phase::QuestionClose;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut SessionStateMachine, action: Action) -> Transition {
        sm.apply(action, 3).unwrap()
    }

    #[test]
    fn initial_state_is_lobby() {
        let sm = SessionStateMachine::new();
        assert_eq!(sm.phase(), Phase::Lobby);
        assert_eq!(sm.at_question(), 0);
    }

    #[test]
    fn full_happy_path_over_two_questions() {
        let mut sm = SessionStateMachine::new();

        assert_eq!(
            apply(&mut sm, Action::NextQuestion).next,
            Phase::QuestionCountdown
        );
        assert_eq!(sm.at_question(), 1);
        assert!(sm.countdown_elapsed());
        assert_eq!(sm.phase(), Phase::QuestionOpen);
        assert!(sm.question_elapsed());
        assert_eq!(sm.phase(), Phase::QuestionClose);
        assert_eq!(apply(&mut sm, Action::GoToAnswer).next, Phase::AnswerShow);

        assert_eq!(
            apply(&mut sm, Action::NextQuestion).next,
            Phase::QuestionCountdown
        );
        assert_eq!(sm.at_question(), 2);
        assert_eq!(
            apply(&mut sm, Action::SkipCountdown).next,
            Phase::QuestionOpen
        );
        assert_eq!(apply(&mut sm, Action::GoToAnswer).next, Phase::AnswerShow);
        assert_eq!(
            apply(&mut sm, Action::GoToFinalResults).next,
            Phase::FinalResults
        );
        assert_eq!(apply(&mut sm, Action::End).next, Phase::End);
    }

    #[test]
    fn next_question_only_from_listed_phases() {
        let mut sm = SessionStateMachine::new();
        apply(&mut sm, Action::NextQuestion);

        let err = sm.apply(Action::NextQuestion, 3).unwrap_err();
        assert_eq!(
            err,
            InvalidTransition {
                from: Phase::QuestionCountdown,
                action: Action::NextQuestion,
            }
        );

        sm.countdown_elapsed();
        assert!(sm.apply(Action::NextQuestion, 3).is_err());
    }

    #[test]
    fn next_question_rejected_past_last_question() {
        let mut sm = SessionStateMachine::new();
        sm.apply(Action::NextQuestion, 1).unwrap();
        sm.countdown_elapsed();
        sm.question_elapsed();

        let err = sm.apply(Action::NextQuestion, 1).unwrap_err();
        assert_eq!(err.from, Phase::QuestionClose);
        assert_eq!(sm.at_question(), 1);
    }

    #[test]
    fn skip_countdown_requires_countdown_phase() {
        let mut sm = SessionStateMachine::new();
        assert!(sm.apply(Action::SkipCountdown, 3).is_err());

        apply(&mut sm, Action::NextQuestion);
        assert_eq!(
            apply(&mut sm, Action::SkipCountdown).timer,
            TimerCommand::ScheduleQuestion
        );
    }

    #[test]
    fn go_to_answer_cancels_pending_timer() {
        let mut sm = SessionStateMachine::new();
        apply(&mut sm, Action::NextQuestion);
        sm.countdown_elapsed();

        let transition = apply(&mut sm, Action::GoToAnswer);
        assert_eq!(transition.timer, TimerCommand::Cancel);
    }

    #[test]
    fn end_reachable_from_every_non_terminal_phase() {
        for setup in [
            Vec::new(),
            vec![Action::NextQuestion],
            vec![Action::NextQuestion, Action::SkipCountdown],
            vec![
                Action::NextQuestion,
                Action::SkipCountdown,
                Action::GoToAnswer,
            ],
            vec![
                Action::NextQuestion,
                Action::SkipCountdown,
                Action::GoToAnswer,
                Action::GoToFinalResults,
            ],
        ] {
            let mut sm = SessionStateMachine::new();
            for action in setup {
                apply(&mut sm, action);
            }
            assert_eq!(apply(&mut sm, Action::End).next, Phase::End);
        }
    }

    #[test]
    fn no_action_applies_after_end() {
        let mut sm = SessionStateMachine::new();
        apply(&mut sm, Action::End);

        for action in [
            Action::NextQuestion,
            Action::SkipCountdown,
            Action::GoToAnswer,
            Action::GoToFinalResults,
            Action::End,
        ] {
            let err = sm.apply(action, 3).unwrap_err();
            assert_eq!(err.from, Phase::End);
        }
    }

    #[test]
    fn stale_timer_callbacks_are_noops() {
        let mut sm = SessionStateMachine::new();
        apply(&mut sm, Action::NextQuestion);
        apply(&mut sm, Action::SkipCountdown);

        // Countdown fired after the phase already moved on.
        assert!(!sm.countdown_elapsed());
        assert_eq!(sm.phase(), Phase::QuestionOpen);

        apply(&mut sm, Action::GoToAnswer);
        assert!(!sm.question_elapsed());
        assert_eq!(sm.phase(), Phase::AnswerShow);
    }

    #[test]
    fn action_strings_parse() {
        assert_eq!("NEXT_QUESTION".parse(), Ok(Action::NextQuestion));
        assert_eq!("SKIP_COUNTDOWN".parse(), Ok(Action::SkipCountdown));
        assert_eq!("GO_TO_ANSWER".parse(), Ok(Action::GoToAnswer));
        assert_eq!("GO_TO_FINAL_RESULTS".parse(), Ok(Action::GoToFinalResults));
        assert_eq!("END".parse(), Ok(Action::End));
        assert_eq!(
            "FAST_FORWARD".parse::<Action>(),
            Err(InvalidAction("FAST_FORWARD".into()))
        );
    }
}
