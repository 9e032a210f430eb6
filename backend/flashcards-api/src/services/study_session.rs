use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use super::deck_sequencer::{DeckSequencer, DeckStatus, SequencerState};
use super::progress_tracker::{ProgressSnapshot, ProgressTracker};
use crate::error::{StudyError, StudyResult};
use crate::metrics::{ANSWERS_RECORDED_TOTAL, SESSIONS_TOTAL};
use crate::models::card::Card;
use crate::models::study::{
    Answer, AnswerOutcome, CardView, SessionOutcome, SessionSummary, SessionView,
};
use crate::utils::shuffle::{shuffle_options, ShuffledOption};

/// One run of the study tool: a deck and its progress, created together.
#[derive(Debug, Clone)]
pub struct StudySession {
    id: String,
    category: Option<String>,
    folders: Vec<String>,
    started_at: DateTime<Utc>,
    progress: ProgressTracker,
    sequencer: DeckSequencer,
    /// Display order for the current card's options, keyed by card id.
    dealt_options: Option<(String, Vec<ShuffledOption>)>,
}

impl StudySession {
    pub fn new(
        category: Option<String>,
        folders: Vec<String>,
        cards: Vec<Card>,
        starting_lives: u32,
    ) -> Self {
        let mut sequencer = DeckSequencer::new();
        sequencer.load(cards);

        let mut progress = ProgressTracker::with_lives(starting_lives);
        progress.set_displayable_total(sequencer.displayable_count());

        let mut session = Self {
            id: Uuid::new_v4().to_string(),
            category,
            folders,
            started_at: Utc::now(),
            progress,
            sequencer,
            dealt_options: None,
        };
        session.deal_options(&mut rand::rng());
        tracing::info!(
            "Study session {} started with {} cards",
            session.id,
            session.sequencer.cards().len()
        );
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.sequencer.current_card()
    }

    pub fn is_complete(&self) -> bool {
        self.sequencer.is_complete()
    }

    pub fn flip(&mut self) -> StudyResult<bool> {
        if self.sequencer.is_complete() {
            return Err(StudyError::NoCurrentCard);
        }
        self.sequencer.flip();
        Ok(self.sequencer.is_flipped())
    }

    pub fn previous(&mut self) {
        self.sequencer.previous(&self.progress);
        self.deal_options(&mut rand::rng());
    }

    /// Grades and records the answer, then moves to the next card.
    pub fn answer(&mut self, answer: Answer) -> StudyResult<AnswerOutcome> {
        let card = self
            .sequencer
            .current_card()
            .cloned()
            .ok_or(StudyError::NoCurrentCard)?;

        let correct = match answer {
            Answer::Choice { original_index } => card.is_correct_option(original_index).ok_or(
                StudyError::InvalidOption {
                    card_id: card.id.clone(),
                    index: original_index,
                },
            )?,
            Answer::SelfReport { .. } if card.is_multiple_choice() => {
                return Err(StudyError::ChoiceRequired(card.id.clone()));
            }
            Answer::SelfReport { correct } => correct,
        };

        let recorded = if correct {
            self.progress.mark_correct(&card.id)
        } else {
            self.progress.mark_incorrect(&card.id)
        };
        if recorded {
            ANSWERS_RECORDED_TOTAL
                .with_label_values(&[if correct { "true" } else { "false" }])
                .inc();
        }

        self.sequencer
            .advance(&self.progress, card.next_card_id.as_deref());
        self.deal_options(&mut rand::rng());

        let session_complete = self.sequencer.is_complete();
        if session_complete {
            let status = match self.outcome() {
                SessionOutcome::OutOfLives => "out_of_lives",
                _ => "completed",
            };
            SESSIONS_TOTAL.with_label_values(&[status]).inc();
            tracing::info!("Study session {} finished: {}", self.id, status);
        }

        tracing::debug!(
            "Answer recorded: session={}, card={}, correct={}, recorded={}",
            self.id,
            card.id,
            correct,
            recorded
        );

        Ok(AnswerOutcome {
            card_id: card.id,
            correct,
            recorded,
            session_complete,
        })
    }

    /// Clears progress and replays the same deck from the top.
    pub fn restart(&mut self) {
        self.progress.reset();
        let cards = self.sequencer.cards().to_vec();
        self.sequencer.load(cards);
        self.progress
            .set_displayable_total(self.sequencer.displayable_count());
        self.deal_options(&mut rand::rng());
        SESSIONS_TOTAL.with_label_values(&["restarted"]).inc();
        tracing::info!("Study session {} restarted", self.id);
    }

    pub fn status(&self) -> DeckStatus {
        self.sequencer.status()
    }

    pub fn state(&self) -> SequencerState {
        self.sequencer.state()
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    pub fn outcome(&self) -> SessionOutcome {
        if !self.sequencer.is_complete() {
            SessionOutcome::InProgress
        } else if !self.progress.has_lives_remaining() {
            SessionOutcome::OutOfLives
        } else {
            SessionOutcome::DeckCompleted
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let correct_count = self.progress.correct_count();
        let incorrect_count = self.progress.incorrect_count();
        let answered = correct_count + incorrect_count;
        let score_percent = (answered > 0)
            .then(|| ((correct_count as f64 / answered as f64) * 100.0).round() as u32);

        SessionSummary {
            correct_count,
            incorrect_count,
            answered,
            score_percent,
            lives_remaining: self.progress.lives_remaining(),
            outcome: self.outcome(),
        }
    }

    pub fn title(&self) -> String {
        match self.current_card() {
            Some(card) => card.display_title(self.category.as_deref()),
            None => self
                .category
                .clone()
                .unwrap_or_else(|| "Flashcards".to_string()),
        }
    }

    /// Shuffles options once per card; staying on the same card keeps its order.
    pub fn deal_options<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(card) = self.sequencer.current_card() else {
            self.dealt_options = None;
            return;
        };

        let already_dealt = self
            .dealt_options
            .as_ref()
            .is_some_and(|(card_id, _)| *card_id == card.id);
        if already_dealt {
            return;
        }

        self.dealt_options = card
            .options
            .as_ref()
            .map(|options| (card.id.clone(), shuffle_options(options, rng)));
    }

    /// Snapshot for display.
    pub fn view(&self) -> SessionView {
        let flipped = self.sequencer.is_flipped();
        let card = self.current_card().map(|card| CardView {
            id: card.id.clone(),
            front: card.front.clone(),
            back: if flipped { card.back.clone() } else { None },
            options: self
                .dealt_options
                .as_ref()
                .filter(|(card_id, _)| *card_id == card.id)
                .map(|(_, options)| options.clone()),
            multiple_choice: card.is_multiple_choice(),
            step_number: card.step_number,
            total_steps: card.total_steps,
        });

        SessionView {
            session_id: self.id.clone(),
            category: self.category.clone(),
            folders: self.folders.clone(),
            started_at: self.started_at,
            title: self.title(),
            state: self.state(),
            card,
            status: self.status(),
            progress: self.progress(),
            summary: self.summary(),
        }
    }
}
