//! Player-facing operations: joining a lobby, reading the current question,
//! submitting answers, and reading per-question and final results.
//!
//! Players authenticate with nothing but the opaque player id handed out on
//! join; each operation resolves that id to its session and takes the
//! session lock, so submissions and admin transitions are serialised.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use tracing::debug;
use uuid::Uuid;

use crate::{
    dto::{
        common::{QuestionResultView, QuestionView, SessionResultsResponse},
        player::{JoinRequest, PlayerStatusResponse},
    },
    error::ServiceError,
    services::session_service,
    state::{
        SharedState,
        session::{Player, Session},
        state_machine::Phase,
    },
};

/// Join a session that is still in its lobby.
///
/// A non-empty name must not collide with another player's. An empty name
/// requests an auto-generated one; generated names are not re-checked
/// against existing players.
pub async fn join(state: &SharedState, request: JoinRequest) -> Result<Uuid, ServiceError> {
    let handle = state
        .session(request.session_id)
        .ok_or(ServiceError::InvalidSession)?;
    let mut session = handle.inner.lock().await;

    let name = request.name;
    if !name.is_empty() && name_taken(&session, &name) {
        return Err(ServiceError::DuplicateName(name));
    }
    if session.phase() != Phase::Lobby {
        return Err(ServiceError::WrongPhase(session.phase()));
    }

    let name = if name.is_empty() {
        generate_player_name()
    } else {
        name
    };

    let player = Player {
        id: Uuid::new_v4(),
        name,
        score: 0.0,
    };
    let player_id = player.id;
    session.players.insert(player_id, player);
    state.index_player(player_id, session.id);
    debug!(session_id = %session.id, %player_id, "player joined");
    Ok(player_id)
}

/// Where the player's session currently is.
pub async fn status(
    state: &SharedState,
    player_id: Uuid,
) -> Result<PlayerStatusResponse, ServiceError> {
    let handle = state.player_session(player_id)?;
    let session = handle.inner.lock().await;
    Ok(PlayerStatusResponse {
        phase: session.phase().into(),
        num_questions: session.total_questions(),
        at_question: session.at_question(),
    })
}

/// The question at a 1-based position, stripped of correctness flags.
///
/// Only available while that question is the current one and the session is
/// actively playing it.
pub async fn question_info(
    state: &SharedState,
    player_id: Uuid,
    position: usize,
) -> Result<QuestionView, ServiceError> {
    let handle = state.player_session(player_id)?;
    let session = handle.inner.lock().await;

    let question = session
        .question_at(position)
        .ok_or(ServiceError::InvalidPosition(position))?;
    if matches!(session.phase(), Phase::Lobby | Phase::End) {
        return Err(ServiceError::WrongPhase(session.phase()));
    }
    if session.at_question() != position {
        return Err(ServiceError::NotYetOnQuestion);
    }
    Ok(QuestionView::from(question))
}

/// Submit the selected answer ids for the question at a 1-based position.
///
/// A fully correct submission (the selected set equals the correct set
/// exactly) scores `points / rank` rounded to one decimal, where rank counts
/// fully correct responders in arrival order. Anything else scores nothing
/// but is still recorded.
pub async fn submit_answers(
    state: &SharedState,
    player_id: Uuid,
    position: usize,
    answer_ids: Vec<Uuid>,
) -> Result<(), ServiceError> {
    let handle = state.player_session(player_id)?;
    let mut session = handle.inner.lock().await;

    let (correct, points) = {
        let question = session
            .question_at(position)
            .ok_or(ServiceError::InvalidPosition(position))?;
        if session.phase() != Phase::QuestionOpen {
            return Err(ServiceError::WrongPhase(session.phase()));
        }
        if session.at_question() < position {
            return Err(ServiceError::NotYetOnQuestion);
        }
        for id in &answer_ids {
            if !question.has_answer(*id) {
                return Err(ServiceError::InvalidAnswerId(*id));
            }
        }
        let correct: HashSet<Uuid> = question.correct_ids().into_iter().collect();
        (correct, question.points)
    };

    let mut seen = HashSet::new();
    if answer_ids.iter().any(|id| !seen.insert(*id)) {
        return Err(ServiceError::DuplicateAnswerId);
    }
    if answer_ids.is_empty() {
        return Err(ServiceError::EmptySubmission);
    }

    let selected: HashSet<Uuid> = answer_ids.iter().copied().collect();
    let fully_correct = selected == correct;
    session.submissions.insert((player_id, position), answer_ids);

    if fully_correct {
        let name = session
            .players
            .get(&player_id)
            .ok_or(ServiceError::InvalidPlayer)?
            .name
            .clone();
        let record = session
            .record_at_mut(position)
            .ok_or(ServiceError::InvalidPosition(position))?;
        record.players_correct.push(name);
        let rank = record.players_correct.len();
        let award = round_to_tenth(f64::from(points) / rank as f64);
        if let Some(player) = session.players.get_mut(&player_id) {
            player.score += award;
            debug!(%player_id, position, rank, award, "correct submission scored");
        }
    }

    Ok(())
}

/// Aggregated result of the question at a 1-based position, available while
/// its answers are being shown.
pub async fn question_results(
    state: &SharedState,
    player_id: Uuid,
    position: usize,
) -> Result<QuestionResultView, ServiceError> {
    let handle = state.player_session(player_id)?;
    let session = handle.inner.lock().await;

    if session.question_at(position).is_none() {
        return Err(ServiceError::InvalidPosition(position));
    }
    if session.phase() != Phase::AnswerShow {
        return Err(ServiceError::WrongPhase(session.phase()));
    }
    if session.at_question() < position {
        return Err(ServiceError::NotYetOnQuestion);
    }

    let record = session
        .ledger
        .get(position - 1)
        .ok_or(ServiceError::InvalidPosition(position))?;
    Ok(QuestionResultView::from(record))
}

/// Final session results, available once the session reached the leaderboard.
pub async fn final_results(
    state: &SharedState,
    player_id: Uuid,
) -> Result<SessionResultsResponse, ServiceError> {
    let handle = state.player_session(player_id)?;
    let session = handle.inner.lock().await;
    if session.phase() != Phase::FinalResults {
        return Err(ServiceError::WrongPhase(session.phase()));
    }
    Ok(session_service::results_payload(&session))
}

fn name_taken(session: &Session, name: &str) -> bool {
    session.players.values().any(|p| p.name == name)
}

/// Generate a display name of 5 distinct letters followed by 3 distinct
/// digits, e.g. `xkqav307`.
fn generate_player_name() -> String {
    let mut rng = rand::rng();
    let mut letters: Vec<char> = ('a'..='z').collect();
    letters.shuffle(&mut rng);
    let mut digits: Vec<char> = ('0'..='9').collect();
    digits.shuffle(&mut rng);
    letters[..5].iter().chain(digits[..3].iter()).collect()
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::admin::{AnswerInput, CreateQuestionRequest, CreateQuizRequest, StartSessionRequest},
        services::quiz_service,
        state::AppState,
    };

    struct Fixture {
        state: SharedState,
        owner: Uuid,
        quiz_id: Uuid,
        session_id: Uuid,
    }

    impl Fixture {
        async fn new(questions: usize) -> Self {
            let state = AppState::new(AppConfig::default());
            let owner = Uuid::new_v4();
            let quiz_id = quiz_service::create_quiz(
                &state,
                owner,
                CreateQuizRequest {
                    name: "Trivia night".into(),
                    description: String::new(),
                },
            )
            .unwrap();
            for index in 0..questions {
                quiz_service::add_question(
                    &state,
                    owner,
                    quiz_id,
                    CreateQuestionRequest {
                        question: format!("Question number {index}?"),
                        duration: 10,
                        points: 5,
                        thumbnail_url: "https://example.com/q.png".into(),
                        answers: vec![
                            AnswerInput {
                                answer: "Right".into(),
                                correct: true,
                            },
                            AnswerInput {
                                answer: "Wrong".into(),
                                correct: false,
                            },
                            AnswerInput {
                                answer: "Also right".into(),
                                correct: true,
                            },
                        ],
                    },
                )
                .unwrap();
            }
            let session_id = session_service::start_session(
                &state,
                owner,
                quiz_id,
                StartSessionRequest { auto_start_num: 3 },
            )
            .await
            .unwrap();
            Self {
                state,
                owner,
                quiz_id,
                session_id,
            }
        }

        async fn join(&self, name: &str) -> Result<Uuid, ServiceError> {
            join(
                &self.state,
                JoinRequest {
                    session_id: self.session_id,
                    name: name.into(),
                },
            )
            .await
        }

        async fn act(&self, action: &str) {
            session_service::transition(
                &self.state,
                self.owner,
                self.quiz_id,
                self.session_id,
                action,
            )
            .await
            .unwrap();
        }

        /// Ids of the current question's correct options and one wrong option.
        fn answer_ids(&self, position: usize) -> (Vec<Uuid>, Uuid) {
            let quiz = self.state.quizzes().get(&self.quiz_id).unwrap();
            let question = &quiz.questions[position - 1];
            let correct = question.correct_ids();
            let wrong = question
                .answers
                .iter()
                .find(|a| !a.correct)
                .map(|a| a.id)
                .unwrap();
            (correct, wrong)
        }
    }

    #[test]
    fn generated_names_have_the_expected_shape() {
        for _ in 0..20 {
            let name = generate_player_name();
            assert_eq!(name.len(), 8);
            let letters: HashSet<char> = name[..5].chars().collect();
            assert_eq!(letters.len(), 5);
            assert!(letters.iter().all(|c| c.is_ascii_lowercase()));
            let digits: HashSet<char> = name[5..].chars().collect();
            assert_eq!(digits.len(), 3);
            assert!(digits.iter().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn awards_round_to_one_decimal() {
        assert_eq!(round_to_tenth(5.0 / 3.0), 1.7);
        assert_eq!(round_to_tenth(5.0 / 2.0), 2.5);
        assert_eq!(round_to_tenth(5.0 / 1.0), 5.0);
    }

    #[tokio::test]
    async fn join_enforces_name_uniqueness_then_phase() {
        let fixture = Fixture::new(1).await;
        fixture.join("alice").await.unwrap();

        let err = fixture.join("alice").await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateName(_)));

        fixture.act("NEXT_QUESTION").await;

        // Name collision reported even though the lobby is closed.
        let err = fixture.join("alice").await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateName(_)));

        let err = fixture.join("bob").await.unwrap_err();
        assert!(matches!(err, ServiceError::WrongPhase(_)));
    }

    #[tokio::test]
    async fn join_with_empty_name_generates_one() {
        let fixture = Fixture::new(1).await;
        let player_id = fixture.join("").await.unwrap();

        let handle = fixture.state.session(fixture.session_id).unwrap();
        let session = handle.inner.lock().await;
        let name = &session.players.get(&player_id).unwrap().name;
        assert_eq!(name.len(), 8);
    }

    #[tokio::test]
    async fn join_unknown_session_is_rejected() {
        let fixture = Fixture::new(1).await;
        let err = join(
            &fixture.state,
            JoinRequest {
                session_id: Uuid::new_v4(),
                name: "alice".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidSession));
    }

    #[tokio::test]
    async fn rank_scaled_scoring_over_three_players() {
        let fixture = Fixture::new(1).await;
        let alice = fixture.join("alice").await.unwrap();
        let bob = fixture.join("bob").await.unwrap();
        let carol = fixture.join("carol").await.unwrap();

        fixture.act("NEXT_QUESTION").await;
        fixture.act("SKIP_COUNTDOWN").await;

        let (correct, _) = fixture.answer_ids(1);
        submit_answers(&fixture.state, alice, 1, correct.clone())
            .await
            .unwrap();
        submit_answers(&fixture.state, bob, 1, correct.clone())
            .await
            .unwrap();
        submit_answers(&fixture.state, carol, 1, correct)
            .await
            .unwrap();

        fixture.act("GO_TO_ANSWER").await;
        fixture.act("GO_TO_FINAL_RESULTS").await;

        let results = final_results(&fixture.state, alice).await.unwrap();
        let scores: Vec<(String, f64)> = results
            .users_ranked_by_score
            .iter()
            .map(|p| (p.name.clone(), p.score))
            .collect();
        assert_eq!(
            scores,
            vec![
                ("alice".to_string(), 5.0),
                ("bob".to_string(), 2.5),
                ("carol".to_string(), 1.7),
            ]
        );
    }

    #[tokio::test]
    async fn resubmitting_while_open_scores_again() {
        let fixture = Fixture::new(1).await;
        let alice = fixture.join("alice").await.unwrap();
        fixture.act("NEXT_QUESTION").await;
        fixture.act("SKIP_COUNTDOWN").await;

        let (correct, _) = fixture.answer_ids(1);
        submit_answers(&fixture.state, alice, 1, correct.clone())
            .await
            .unwrap();
        // Still open: the second fully correct submission ranks second
        // against the first and scores again.
        submit_answers(&fixture.state, alice, 1, correct)
            .await
            .unwrap();

        let handle = fixture.state.session(fixture.session_id).unwrap();
        let session = handle.inner.lock().await;
        assert_eq!(session.players.get(&alice).unwrap().score, 7.5);
        let record = &session.ledger[0];
        assert_eq!(record.players_correct, vec!["alice", "alice"]);
        // The stored selection is overwritten, not accumulated.
        assert_eq!(session.submissions.len(), 1);
    }

    #[tokio::test]
    async fn partial_overlap_scores_nothing_but_is_recorded() {
        let fixture = Fixture::new(1).await;
        let alice = fixture.join("alice").await.unwrap();
        fixture.act("NEXT_QUESTION").await;
        fixture.act("SKIP_COUNTDOWN").await;

        let (correct, _) = fixture.answer_ids(1);
        // Only one of the two correct options.
        submit_answers(&fixture.state, alice, 1, vec![correct[0]])
            .await
            .unwrap();

        fixture.act("GO_TO_ANSWER").await;
        let result = question_results(&fixture.state, alice, 1).await.unwrap();
        assert!(result.players_correct_list.is_empty());

        let handle = fixture.state.session(fixture.session_id).unwrap();
        let session = handle.inner.lock().await;
        assert_eq!(session.players.get(&alice).unwrap().score, 0.0);
        assert!(session.submissions.contains_key(&(alice, 1)));
    }

    #[tokio::test]
    async fn submission_payload_is_validated_in_order() {
        let fixture = Fixture::new(1).await;
        let alice = fixture.join("alice").await.unwrap();
        fixture.act("NEXT_QUESTION").await;
        fixture.act("SKIP_COUNTDOWN").await;

        let (correct, _) = fixture.answer_ids(1);

        let stranger = Uuid::new_v4();
        let err = submit_answers(&fixture.state, stranger, 1, correct.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPlayer));

        let err = submit_answers(&fixture.state, alice, 2, correct.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPosition(2)));

        let unknown = Uuid::new_v4();
        let err = submit_answers(&fixture.state, alice, 1, vec![unknown])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidAnswerId(id) if id == unknown));

        let err = submit_answers(&fixture.state, alice, 1, vec![correct[0], correct[0]])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateAnswerId));

        let err = submit_answers(&fixture.state, alice, 1, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmptySubmission));
    }

    #[tokio::test]
    async fn submissions_only_while_the_question_is_open() {
        let fixture = Fixture::new(1).await;
        let alice = fixture.join("alice").await.unwrap();
        let (correct, _) = fixture.answer_ids(1);

        let err = submit_answers(&fixture.state, alice, 1, correct.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::WrongPhase(Phase::Lobby)));

        fixture.act("NEXT_QUESTION").await;
        let err = submit_answers(&fixture.state, alice, 1, correct.clone())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::WrongPhase(Phase::QuestionCountdown)
        ));

        fixture.act("SKIP_COUNTDOWN").await;
        submit_answers(&fixture.state, alice, 1, correct.clone())
            .await
            .unwrap();

        fixture.act("GO_TO_ANSWER").await;
        let err = submit_answers(&fixture.state, alice, 1, correct)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::WrongPhase(Phase::AnswerShow)));
    }

    #[tokio::test]
    async fn question_info_is_gated_to_the_current_question() {
        let fixture = Fixture::new(2).await;
        let alice = fixture.join("alice").await.unwrap();

        let err = question_info(&fixture.state, alice, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::WrongPhase(Phase::Lobby)));

        fixture.act("NEXT_QUESTION").await;
        let info = question_info(&fixture.state, alice, 1).await.unwrap();
        assert_eq!(info.answers.len(), 3);

        let err = question_info(&fixture.state, alice, 2).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotYetOnQuestion));

        let err = question_info(&fixture.state, alice, 3).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPosition(3)));

        fixture.act("END").await;
        let err = question_info(&fixture.state, alice, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::WrongPhase(Phase::End)));
    }

    #[tokio::test]
    async fn question_results_list_correct_players_sorted() {
        let fixture = Fixture::new(1).await;
        let zoe = fixture.join("zoe").await.unwrap();
        let alice = fixture.join("alice").await.unwrap();

        fixture.act("NEXT_QUESTION").await;
        fixture.act("SKIP_COUNTDOWN").await;
        let (correct, _) = fixture.answer_ids(1);
        submit_answers(&fixture.state, zoe, 1, correct.clone())
            .await
            .unwrap();
        submit_answers(&fixture.state, alice, 1, correct)
            .await
            .unwrap();

        let err = question_results(&fixture.state, alice, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::WrongPhase(Phase::QuestionOpen)));

        fixture.act("GO_TO_ANSWER").await;
        let result = question_results(&fixture.state, alice, 1).await.unwrap();
        // Sorted for display even though zoe answered first.
        assert_eq!(result.players_correct_list, vec!["alice", "zoe"]);
        assert_eq!(result.average_answer_time, 0.0);
        assert_eq!(result.percent_correct, 0.0);
    }

    #[tokio::test]
    async fn full_playthrough_over_two_questions() {
        let fixture = Fixture::new(2).await;
        let alice = fixture.join("alice").await.unwrap();
        let bob = fixture.join("bob").await.unwrap();

        for position in 1..=2 {
            fixture.act("NEXT_QUESTION").await;
            fixture.act("SKIP_COUNTDOWN").await;
            let (correct, wrong) = fixture.answer_ids(position);
            submit_answers(&fixture.state, alice, position, correct)
                .await
                .unwrap();
            submit_answers(&fixture.state, bob, position, vec![wrong])
                .await
                .unwrap();
            fixture.act("GO_TO_ANSWER").await;
        }
        fixture.act("GO_TO_FINAL_RESULTS").await;

        let status = status(&fixture.state, bob).await.unwrap();
        assert_eq!(status.num_questions, 2);
        assert_eq!(status.at_question, 2);

        let results = final_results(&fixture.state, bob).await.unwrap();
        assert_eq!(results.users_ranked_by_score[0].name, "alice");
        assert_eq!(results.users_ranked_by_score[0].score, 10.0);
        assert_eq!(results.users_ranked_by_score[1].name, "bob");
        assert_eq!(results.users_ranked_by_score[1].score, 0.0);
        assert_eq!(results.question_results.len(), 2);
        for result in &results.question_results {
            assert_eq!(result.players_correct_list, vec!["alice"]);
        }
    }
}
