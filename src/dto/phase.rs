use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::Phase;

/// Session phase exposed to clients over the REST surface.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    /// Players can join.
    Lobby,
    /// Countdown before the question opens.
    QuestionCountdown,
    /// Question accepts submissions.
    QuestionOpen,
    /// Submissions closed.
    QuestionClose,
    /// Correct answers revealed.
    AnswerShow,
    /// Final leaderboard available.
    FinalResults,
    /// Session terminated.
    End,
}

impl From<Phase> for SessionPhase {
    fn from(value: Phase) -> Self {
        match value {
            Phase::Lobby => SessionPhase::Lobby,
            Phase::QuestionCountdown => SessionPhase::QuestionCountdown,
            Phase::QuestionOpen => SessionPhase::QuestionOpen,
            Phase::QuestionClose => SessionPhase::QuestionClose,
            Phase::AnswerShow => SessionPhase::AnswerShow,
            Phase::FinalResults => SessionPhase::FinalResults,
            Phase::End => SessionPhase::End,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_serialize_to_screaming_snake_case() {
        let json = serde_json::to_string(&SessionPhase::QuestionCountdown).unwrap();
        assert_eq!(json, "\"QUESTION_COUNTDOWN\"");
        let json = serde_json::to_string(&SessionPhase::from(Phase::End)).unwrap();
        assert_eq!(json, "\"END\"");
    }
}
