use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_LIVES: u32 = 3;

/// Answer bookkeeping for one study session.
///
/// Every card is counted at most once: the first mark wins and later marks
/// for the same id are ignored.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    correct_count: u32,
    incorrect_count: u32,
    lives_remaining: u32,
    starting_lives: u32,
    completed: HashSet<String>,
    displayable_total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub lives_remaining: u32,
    pub starting_lives: u32,
    pub completed_count: usize,
    pub displayable_total: usize,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::with_lives(DEFAULT_LIVES)
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lives(starting_lives: u32) -> Self {
        Self {
            correct_count: 0,
            incorrect_count: 0,
            lives_remaining: starting_lives,
            starting_lives,
            completed: HashSet::new(),
            displayable_total: 0,
        }
    }

    /// Returns false when the card had already been completed.
    pub fn mark_correct(&mut self, card_id: &str) -> bool {
        if !self.completed.insert(card_id.to_string()) {
            tracing::debug!("Ignoring repeat answer for completed card {}", card_id);
            return false;
        }
        self.correct_count += 1;
        true
    }

    /// Returns false when the card had already been completed.
    pub fn mark_incorrect(&mut self, card_id: &str) -> bool {
        if !self.completed.insert(card_id.to_string()) {
            tracing::debug!("Ignoring repeat answer for completed card {}", card_id);
            return false;
        }
        self.incorrect_count += 1;
        self.lives_remaining = self.lives_remaining.saturating_sub(1);
        if self.lives_remaining == 0 {
            tracing::info!("Out of lives after card {}", card_id);
        }
        true
    }

    pub fn has_lives_remaining(&self) -> bool {
        self.lives_remaining > 0
    }

    pub fn is_completed(&self, card_id: &str) -> bool {
        self.completed.contains(card_id)
    }

    pub fn set_displayable_total(&mut self, total: usize) {
        self.displayable_total = total;
    }

    pub fn reset(&mut self) {
        self.correct_count = 0;
        self.incorrect_count = 0;
        self.lives_remaining = self.starting_lives;
        self.completed.clear();
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn incorrect_count(&self) -> u32 {
        self.incorrect_count
    }

    pub fn lives_remaining(&self) -> u32 {
        self.lives_remaining
    }

    pub fn displayable_total(&self) -> usize {
        self.displayable_total
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            correct_count: self.correct_count,
            incorrect_count: self.incorrect_count,
            lives_remaining: self.lives_remaining,
            starting_lives: self.starting_lives,
            completed_count: self.completed.len(),
            displayable_total: self.displayable_total,
        }
    }
}
