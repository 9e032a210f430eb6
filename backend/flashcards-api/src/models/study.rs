use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::deck_sequencer::{DeckStatus, SequencerState};
use crate::services::progress_tracker::ProgressSnapshot;
use crate::utils::shuffle::ShuffledOption;

/// How the learner answered the current card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    /// Flip cards: the learner reports whether they knew it.
    SelfReport { correct: bool },
    /// Multiple choice: index of the chosen option in stored order.
    Choice { original_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    InProgress,
    DeckCompleted,
    OutOfLives,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub card_id: String,
    pub correct: bool,
    /// False when the card had already been answered earlier in the session.
    pub recorded: bool,
    pub session_complete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub answered: u32,
    pub score_percent: Option<u32>,
    pub lives_remaining: u32,
    pub outcome: SessionOutcome,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: Option<String>,
    #[serde(default)]
    pub folders: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SelectCategoryRequest {
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub id: String,
    pub front: String,
    /// Only present once a flip card has been turned over.
    pub back: Option<String>,
    pub options: Option<Vec<ShuffledOption>>,
    pub multiple_choice: bool,
    pub step_number: Option<u32>,
    pub total_steps: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub category: Option<String>,
    pub folders: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub title: String,
    pub state: SequencerState,
    pub card: Option<CardView>,
    pub status: DeckStatus,
    pub progress: ProgressSnapshot,
    pub summary: SessionSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub outcome: AnswerOutcome,
    pub session: SessionView,
}
