//! Projections of quiz and result state shared by the admin and player APIs.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    quiz::{AnswerOption, Question, Quiz},
    session::{Player, QuestionRecord},
};

/// An answer option as shown to players: no correctness flag.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct AnswerView {
    pub answer_id: Uuid,
    pub answer: String,
    pub colour: String,
}

impl From<&AnswerOption> for AnswerView {
    fn from(value: &AnswerOption) -> Self {
        Self {
            answer_id: value.id,
            answer: value.text.clone(),
            colour: value.colour.as_str().to_owned(),
        }
    }
}

/// A question as shown to players while answering: no correctness flags.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct QuestionView {
    pub question_id: Uuid,
    pub question: String,
    pub duration: u32,
    pub thumbnail_url: String,
    pub points: u32,
    pub answers: Vec<AnswerView>,
}

impl From<&Question> for QuestionView {
    fn from(value: &Question) -> Self {
        Self {
            question_id: value.id,
            question: value.text.clone(),
            duration: value.duration_secs,
            thumbnail_url: value.thumbnail_url.clone(),
            points: value.points,
            answers: value.answers.iter().map(AnswerView::from).collect(),
        }
    }
}

/// An answer option in the admin-facing snapshot, correctness included.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct AnswerSnapshot {
    pub answer_id: Uuid,
    pub answer: String,
    pub colour: String,
    pub correct: bool,
}

impl From<&AnswerOption> for AnswerSnapshot {
    fn from(value: &AnswerOption) -> Self {
        Self {
            answer_id: value.id,
            answer: value.text.clone(),
            colour: value.colour.as_str().to_owned(),
            correct: value.correct,
        }
    }
}

/// A question in the admin-facing snapshot, correctness included.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct QuestionSnapshot {
    pub question_id: Uuid,
    pub question: String,
    pub duration: u32,
    pub thumbnail_url: String,
    pub points: u32,
    pub answers: Vec<AnswerSnapshot>,
}

impl From<&Question> for QuestionSnapshot {
    fn from(value: &Question) -> Self {
        Self {
            question_id: value.id,
            question: value.text.clone(),
            duration: value.duration_secs,
            thumbnail_url: value.thumbnail_url.clone(),
            points: value.points,
            answers: value.answers.iter().map(AnswerSnapshot::from).collect(),
        }
    }
}

/// Admin-facing copy of the quiz metadata a session was started with.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct QuizMetadata {
    pub quiz_id: Uuid,
    pub name: String,
    pub description: String,
    pub num_questions: usize,
    pub duration: u32,
    pub questions: Vec<QuestionSnapshot>,
}

impl From<&Quiz> for QuizMetadata {
    fn from(value: &Quiz) -> Self {
        Self {
            quiz_id: value.id,
            name: value.name.clone(),
            description: value.description.clone(),
            num_questions: value.questions.len(),
            duration: value.total_duration_secs(),
            questions: value.questions.iter().map(QuestionSnapshot::from).collect(),
        }
    }
}

/// Aggregated result of one question once answers are shown.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct QuestionResultView {
    pub question_id: Uuid,
    /// Fully correct responders, lexicographically sorted for display.
    pub players_correct_list: Vec<String>,
    pub average_answer_time: f64,
    pub percent_correct: f64,
}

impl From<&QuestionRecord> for QuestionResultView {
    fn from(value: &QuestionRecord) -> Self {
        let mut players_correct_list = value.players_correct.clone();
        players_correct_list.sort();
        Self {
            question_id: value.question_id,
            players_correct_list,
            average_answer_time: value.average_answer_time,
            percent_correct: value.percent_correct,
        }
    }
}

/// One leaderboard entry.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct RankedPlayer {
    pub name: String,
    pub score: f64,
}

impl From<&Player> for RankedPlayer {
    fn from(value: &Player) -> Self {
        Self {
            name: value.name.clone(),
            score: value.score,
        }
    }
}

/// Final results payload shared by the admin and player surfaces.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct SessionResultsResponse {
    /// Players sorted by descending score (ties keep join order).
    pub users_ranked_by_score: Vec<RankedPlayer>,
    /// One entry per question, in quiz order.
    pub question_results: Vec<QuestionResultView>,
}
