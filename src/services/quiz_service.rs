//! Catalog operations: the minimal quiz/question writes needed to host
//! sessions. Editing, trashing, and transfer of quizzes are out of scope;
//! a session snapshots the quiz at start time and never sees later changes.

use uuid::Uuid;

use crate::{
    dto::admin::{CreateQuestionRequest, CreateQuizRequest},
    error::ServiceError,
    state::{
        SharedState,
        quiz::{AnswerColour, AnswerOption, Question, Quiz},
    },
};

const QUESTION_TEXT_RANGE: std::ops::RangeInclusive<usize> = 5..=50;
const ANSWER_COUNT_RANGE: std::ops::RangeInclusive<usize> = 2..=6;
const ANSWER_TEXT_RANGE: std::ops::RangeInclusive<usize> = 1..=30;
const POINTS_RANGE: std::ops::RangeInclusive<u32> = 1..=10;
/// Sum of question durations a quiz may reach, in seconds.
const MAX_QUIZ_DURATION_SECS: u32 = 180;

/// Check that `owner_id` owns the quiz, without exposing whether the quiz
/// exists at all: an unknown quiz id is indistinguishable from someone
/// else's quiz.
pub fn require_owner(
    state: &SharedState,
    owner_id: Uuid,
    quiz_id: Uuid,
) -> Result<(), ServiceError> {
    match state.quizzes().get(&quiz_id) {
        Some(quiz) if quiz.owner_id == owner_id => Ok(()),
        _ => Err(ServiceError::Forbidden),
    }
}

/// Fetch a clone of a quiz the caller owns.
pub fn owned_quiz(
    state: &SharedState,
    owner_id: Uuid,
    quiz_id: Uuid,
) -> Result<Quiz, ServiceError> {
    state
        .quizzes()
        .get(&quiz_id)
        .filter(|quiz| quiz.owner_id == owner_id)
        .map(|quiz| quiz.clone())
        .ok_or(ServiceError::Forbidden)
}

/// Register a new quiz for the given administrator.
pub fn create_quiz(
    state: &SharedState,
    owner_id: Uuid,
    request: CreateQuizRequest,
) -> Result<Uuid, ServiceError> {
    let CreateQuizRequest { name, description } = request;

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        return Err(ServiceError::InvalidInput(
            "quiz name may only contain alphanumeric characters and spaces".into(),
        ));
    }

    let taken = state
        .quizzes()
        .iter()
        .any(|entry| entry.owner_id == owner_id && entry.name == name);
    if taken {
        return Err(ServiceError::InvalidInput(format!(
            "quiz name `{name}` is already used by this administrator"
        )));
    }

    let quiz = Quiz::new(owner_id, name, description);
    let id = quiz.id;
    state.quizzes().insert(id, quiz);
    Ok(id)
}

/// Append a question to a quiz the caller owns.
pub fn add_question(
    state: &SharedState,
    owner_id: Uuid,
    quiz_id: Uuid,
    request: CreateQuestionRequest,
) -> Result<Uuid, ServiceError> {
    require_owner(state, owner_id, quiz_id)?;

    let mut quiz = state
        .quizzes()
        .get_mut(&quiz_id)
        .ok_or(ServiceError::Forbidden)?;

    let CreateQuestionRequest {
        question,
        duration,
        points,
        thumbnail_url,
        answers,
    } = request;

    if !QUESTION_TEXT_RANGE.contains(&question.chars().count()) {
        return Err(ServiceError::InvalidInput(
            "question text must be between 5 and 50 characters".into(),
        ));
    }

    if !ANSWER_COUNT_RANGE.contains(&answers.len()) {
        return Err(ServiceError::InvalidInput(
            "a question must have between 2 and 6 answers".into(),
        ));
    }

    if duration < 1 || quiz.total_duration_secs() + duration > MAX_QUIZ_DURATION_SECS {
        return Err(ServiceError::InvalidInput(
            "invalid duration, or the quiz would exceed 3 minutes in total".into(),
        ));
    }

    if !POINTS_RANGE.contains(&points) {
        return Err(ServiceError::InvalidInput(
            "points must be between 1 and 10".into(),
        ));
    }

    if answers
        .iter()
        .any(|a| !ANSWER_TEXT_RANGE.contains(&a.answer.chars().count()))
    {
        return Err(ServiceError::InvalidInput(
            "answer text must be between 1 and 30 characters".into(),
        ));
    }

    for (index, answer) in answers.iter().enumerate() {
        if answers[..index].iter().any(|a| a.answer == answer.answer) {
            return Err(ServiceError::InvalidInput(format!(
                "duplicate answer text `{}`",
                answer.answer
            )));
        }
    }

    if !answers.iter().any(|a| a.correct) {
        return Err(ServiceError::InvalidInput(
            "at least one answer must be marked correct".into(),
        ));
    }

    validate_thumbnail_url(&thumbnail_url)?;

    let question = Question {
        id: Uuid::new_v4(),
        text: question,
        duration_secs: duration,
        points,
        thumbnail_url,
        answers: answers
            .into_iter()
            .map(|a| AnswerOption {
                id: Uuid::new_v4(),
                text: a.answer,
                colour: AnswerColour::random(),
                correct: a.correct,
            })
            .collect(),
    };

    let id = question.id;
    quiz.questions.push(question);
    quiz.updated_at = time::OffsetDateTime::now_utc();
    Ok(id)
}

fn validate_thumbnail_url(url: &str) -> Result<(), ServiceError> {
    if url.is_empty() {
        return Err(ServiceError::InvalidInput(
            "thumbnail url must not be empty".into(),
        ));
    }

    let lower = url.to_ascii_lowercase();
    if !["jpg", "jpeg", "png"].iter().any(|ext| lower.ends_with(ext)) {
        return Err(ServiceError::InvalidInput(
            "thumbnail url must end with jpg, jpeg, or png".into(),
        ));
    }

    if !["http://", "https://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
    {
        return Err(ServiceError::InvalidInput(
            "thumbnail url must begin with http:// or https://".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, dto::admin::AnswerInput, state::AppState};

    fn new_state() -> SharedState {
        AppState::new(AppConfig::default())
    }

    fn question_request() -> CreateQuestionRequest {
        CreateQuestionRequest {
            question: "What is the capital of France?".into(),
            duration: 30,
            points: 5,
            thumbnail_url: "https://example.com/paris.png".into(),
            answers: vec![
                AnswerInput {
                    answer: "Paris".into(),
                    correct: true,
                },
                AnswerInput {
                    answer: "Lyon".into(),
                    correct: false,
                },
            ],
        }
    }

    #[test]
    fn create_quiz_and_question() {
        let state = new_state();
        let owner = Uuid::new_v4();
        let quiz_id = create_quiz(
            &state,
            owner,
            CreateQuizRequest {
                name: "Geography 101".into(),
                description: "Capitals".into(),
            },
        )
        .unwrap();

        let question_id = add_question(&state, owner, quiz_id, question_request()).unwrap();

        let quiz = state.quizzes().get(&quiz_id).unwrap();
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].id, question_id);
        assert_eq!(quiz.total_duration_secs(), 30);
    }

    #[test]
    fn quiz_name_unique_per_owner() {
        let state = new_state();
        let owner = Uuid::new_v4();
        let request = || CreateQuizRequest {
            name: "Trivia".into(),
            description: String::new(),
        };
        create_quiz(&state, owner, request()).unwrap();
        assert!(matches!(
            create_quiz(&state, owner, request()),
            Err(ServiceError::InvalidInput(_))
        ));

        // A different administrator may reuse the name.
        create_quiz(&state, Uuid::new_v4(), request()).unwrap();
    }

    #[test]
    fn question_validation_rejects_bad_input() {
        let state = new_state();
        let owner = Uuid::new_v4();
        let quiz_id = create_quiz(
            &state,
            owner,
            CreateQuizRequest {
                name: "Trivia".into(),
                description: String::new(),
            },
        )
        .unwrap();

        let mut short_text = question_request();
        short_text.question = "Hi?".into();
        assert!(add_question(&state, owner, quiz_id, short_text).is_err());

        let mut one_answer = question_request();
        one_answer.answers.truncate(1);
        assert!(add_question(&state, owner, quiz_id, one_answer).is_err());

        let mut no_correct = question_request();
        for answer in &mut no_correct.answers {
            answer.correct = false;
        }
        assert!(add_question(&state, owner, quiz_id, no_correct).is_err());

        let mut bad_url = question_request();
        bad_url.thumbnail_url = "ftp://example.com/img.png".into();
        assert!(add_question(&state, owner, quiz_id, bad_url).is_err());

        let mut too_long = question_request();
        too_long.duration = 200;
        assert!(add_question(&state, owner, quiz_id, too_long).is_err());
    }

    #[test]
    fn ownership_is_enforced() {
        let state = new_state();
        let owner = Uuid::new_v4();
        let quiz_id = create_quiz(
            &state,
            owner,
            CreateQuizRequest {
                name: "Trivia".into(),
                description: String::new(),
            },
        )
        .unwrap();

        let stranger = Uuid::new_v4();
        assert!(matches!(
            add_question(&state, stranger, quiz_id, question_request()),
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            require_owner(&state, stranger, quiz_id),
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            require_owner(&state, owner, Uuid::new_v4()),
            Err(ServiceError::Forbidden)
        ));
    }
}
