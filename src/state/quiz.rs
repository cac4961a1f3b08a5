use rand::prelude::IndexedRandom;
use time::OffsetDateTime;
use uuid::Uuid;

/// Display colour assigned to an answer option when the question is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerColour {
    Blue,
    Brown,
    Green,
    Orange,
    Purple,
    Red,
    Yellow,
}

impl AnswerColour {
    const ALL: [AnswerColour; 7] = [
        AnswerColour::Blue,
        AnswerColour::Brown,
        AnswerColour::Green,
        AnswerColour::Orange,
        AnswerColour::Purple,
        AnswerColour::Red,
        AnswerColour::Yellow,
    ];

    /// Pick a colour uniformly at random from the palette.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        *Self::ALL.choose(&mut rng).unwrap_or(&AnswerColour::Blue)
    }

    /// Lowercase wire name of the colour.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerColour::Blue => "blue",
            AnswerColour::Brown => "brown",
            AnswerColour::Green => "green",
            AnswerColour::Orange => "orange",
            AnswerColour::Purple => "purple",
            AnswerColour::Red => "red",
            AnswerColour::Yellow => "yellow",
        }
    }
}

/// One selectable option of a question.
#[derive(Debug, Clone)]
pub struct AnswerOption {
    /// Stable identifier submitted back by players.
    pub id: Uuid,
    /// Option text shown to players.
    pub text: String,
    /// Display colour assigned at creation.
    pub colour: AnswerColour,
    /// Whether this option is part of the correct set.
    pub correct: bool,
}

/// A timed multiple-choice question.
#[derive(Debug, Clone)]
pub struct Question {
    /// Stable identifier for the question.
    pub id: Uuid,
    /// Question text shown to players.
    pub text: String,
    /// Seconds the question stays open for submissions.
    pub duration_secs: u32,
    /// Points awarded to the first fully correct responder.
    pub points: u32,
    /// Thumbnail image shown alongside the question.
    pub thumbnail_url: String,
    /// Ordered answer options (2 to 6, at least one correct).
    pub answers: Vec<AnswerOption>,
}

impl Question {
    /// Ids of the options forming the correct set.
    pub fn correct_ids(&self) -> Vec<Uuid> {
        self.answers
            .iter()
            .filter(|a| a.correct)
            .map(|a| a.id)
            .collect()
    }

    /// Whether `id` names one of this question's options.
    pub fn has_answer(&self, id: Uuid) -> bool {
        self.answers.iter().any(|a| a.id == id)
    }
}

/// A quiz definition owned by an administrator.
///
/// Sessions copy the quiz wholesale when they start, so later catalog edits
/// never affect a running or ended session.
#[derive(Debug, Clone)]
pub struct Quiz {
    /// Stable identifier for the quiz.
    pub id: Uuid,
    /// Opaque identity of the owning administrator.
    pub owner_id: Uuid,
    /// Quiz name, unique among the owner's quizzes.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Ordered question list played in sequence.
    pub questions: Vec<Question>,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
    /// Last time a question was added.
    pub updated_at: OffsetDateTime,
}

impl Quiz {
    /// Build an empty quiz for the given owner.
    pub fn new(owner_id: Uuid, name: String, description: String) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            description,
            questions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of all question durations in seconds.
    pub fn total_duration_secs(&self) -> u32 {
        self.questions.iter().map(|q| q.duration_secs).sum()
    }
}
