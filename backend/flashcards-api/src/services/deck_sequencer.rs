use serde::Serialize;

use super::progress_tracker::ProgressTracker;
use crate::models::card::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencerState {
    Browsing,
    Flipped,
    SessionComplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckStatus {
    pub total_displayable: usize,
    /// `None` once the session is complete.
    pub position: Option<usize>,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Owns the session deck and walks it card by card.
///
/// Chained cards (`next_card_id`) are entered only through an explicit link;
/// plain sequential movement skips `never_display_first` cards.
#[derive(Debug, Clone, Default)]
pub struct DeckSequencer {
    deck: Vec<Card>,
    current: Option<usize>,
    flipped: bool,
}

impl DeckSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, cards: Vec<Card>) {
        self.deck = cards;
        self.flipped = false;
        self.current = if self.deck.first().is_some_and(Card::is_displayable) {
            Some(0)
        } else {
            self.deck.iter().position(Card::is_displayable)
        };

        match self.current {
            Some(index) => tracing::debug!(
                "Deck loaded: {} cards, starting at {}",
                self.deck.len(),
                self.deck[index].id
            ),
            None => tracing::info!("Deck loaded with no displayable cards, session complete"),
        }
    }

    pub fn flip(&mut self) {
        match self.current_card() {
            Some(card) if !card.is_multiple_choice() => self.flipped = !self.flipped,
            _ => {}
        }
    }

    /// Moves past the current card after its answer has been recorded.
    pub fn advance(&mut self, progress: &ProgressTracker, explicit_next_id: Option<&str>) {
        if !progress.has_lives_remaining() {
            tracing::info!("No lives remaining, ending session");
            self.finish();
            return;
        }

        let Some(current) = self.current else {
            return;
        };

        if let Some(next_id) = explicit_next_id {
            if let Some(index) = self.position_of(next_id) {
                tracing::debug!("Following chain to {} at {}", next_id, index);
                self.land_on(index);
                return;
            }
            tracing::warn!(
                "Chain link {} not found in deck, falling back to sequential order",
                next_id
            );
        }

        let next = self
            .deck
            .iter()
            .enumerate()
            .skip(current + 1)
            .find(|(_, card)| card.is_displayable() && !progress.is_completed(&card.id))
            .map(|(index, _)| index);

        match next {
            Some(index) => self.land_on(index),
            None => {
                tracing::info!("All cards completed");
                self.finish();
            }
        }
    }

    /// Steps back to the closest earlier card still open for answering.
    pub fn previous(&mut self, progress: &ProgressTracker) {
        let Some(current) = self.current else {
            return;
        };

        let target = (0..current)
            .rev()
            .find(|&index| {
                let card = &self.deck[index];
                card.is_displayable() && !progress.is_completed(&card.id)
            })
            .unwrap_or(0);

        self.land_on(target);
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.current.and_then(|index| self.deck.get(index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_complete(&self) -> bool {
        self.current.is_none()
    }

    pub fn state(&self) -> SequencerState {
        match (self.current, self.flipped) {
            (None, _) => SequencerState::SessionComplete,
            (Some(_), true) => SequencerState::Flipped,
            (Some(_), false) => SequencerState::Browsing,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.deck
    }

    pub fn displayable_count(&self) -> usize {
        self.deck.iter().filter(|card| card.is_displayable()).count()
    }

    pub fn status(&self) -> DeckStatus {
        DeckStatus {
            total_displayable: self.displayable_count(),
            position: self.current,
            has_next: self
                .current
                .is_some_and(|index| index + 1 < self.deck.len()),
            has_previous: self.current.is_some_and(|index| index > 0),
        }
    }

    fn position_of(&self, card_id: &str) -> Option<usize> {
        self.deck.iter().position(|card| card.id == card_id)
    }

    fn land_on(&mut self, index: usize) {
        self.current = Some(index);
        self.flipped = false;
    }

    fn finish(&mut self) {
        self.current = None;
        self.flipped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_deck() -> Vec<Card> {
        vec![
            Card::new("s1", "step one").with_next("s2"),
            Card::new("s2", "step two").never_first(),
        ]
    }

    #[test]
    fn load_starts_at_first_card() {
        let mut deck = DeckSequencer::new();
        deck.load(chain_deck());
        assert_eq!(deck.current_index(), Some(0));
        assert_eq!(deck.state(), SequencerState::Browsing);
    }

    #[test]
    fn empty_deck_is_complete_immediately() {
        let mut deck = DeckSequencer::new();
        deck.load(Vec::new());
        assert!(deck.is_complete());
        assert!(deck.current_card().is_none());
        assert_eq!(deck.state(), SequencerState::SessionComplete);
    }

    #[test]
    fn explicit_link_reaches_never_first_card() {
        let progress = ProgressTracker::new();
        let mut deck = DeckSequencer::new();
        deck.load(chain_deck());

        deck.advance(&progress, Some("s2"));
        assert_eq!(deck.current_index(), Some(1));
        assert_eq!(deck.current_card().map(|c| c.id.as_str()), Some("s2"));
    }

    #[test]
    fn sequential_advance_skips_never_first_cards() {
        let progress = ProgressTracker::new();
        let mut deck = DeckSequencer::new();
        deck.load(vec![
            Card::new("a", "a"),
            Card::new("hidden", "h").never_first(),
            Card::new("b", "b"),
        ]);

        deck.advance(&progress, None);
        assert_eq!(deck.current_card().map(|c| c.id.as_str()), Some("b"));

        deck.advance(&progress, None);
        assert!(deck.is_complete());
    }

    #[test]
    fn dangling_link_falls_back_to_sequential_order() {
        let progress = ProgressTracker::new();
        let mut deck = DeckSequencer::new();
        deck.load(vec![Card::new("a", "a").with_next("gone"), Card::new("b", "b")]);

        deck.advance(&progress, Some("gone"));
        assert_eq!(deck.current_index(), Some(1));
    }

    #[test]
    fn no_lives_ends_session_even_with_chain_link() {
        let mut progress = ProgressTracker::with_lives(1);
        let mut deck = DeckSequencer::new();
        deck.load(chain_deck());

        progress.mark_incorrect("s1");
        assert!(!progress.has_lives_remaining());

        deck.advance(&progress, Some("s2"));
        assert!(deck.is_complete());
        assert_eq!(deck.current_index(), None);
    }

    #[test]
    fn advance_skips_completed_cards() {
        let mut progress = ProgressTracker::new();
        let mut deck = DeckSequencer::new();
        deck.load(vec![Card::new("a", "a"), Card::new("b", "b"), Card::new("c", "c")]);

        progress.mark_correct("b");
        deck.advance(&progress, None);
        assert_eq!(deck.current_card().map(|c| c.id.as_str()), Some("c"));
    }

    #[test]
    fn flip_toggles_and_resets_on_advance() {
        let progress = ProgressTracker::new();
        let mut deck = DeckSequencer::new();
        deck.load(vec![Card::new("a", "a").with_back("A"), Card::new("b", "b")]);

        deck.flip();
        assert!(deck.is_flipped());
        assert_eq!(deck.state(), SequencerState::Flipped);
        deck.flip();
        assert!(!deck.is_flipped());

        deck.flip();
        deck.advance(&progress, None);
        assert!(!deck.is_flipped());
    }

    #[test]
    fn flip_is_noop_for_multiple_choice() {
        let mut deck = DeckSequencer::new();
        deck.load(vec![Card::new("a", "2+2?").with_options(["4", "3"])]);

        deck.flip();
        assert!(!deck.is_flipped());
    }

    #[test]
    fn previous_clamps_at_zero() {
        let progress = ProgressTracker::new();
        let mut deck = DeckSequencer::new();
        deck.load(vec![Card::new("a", "a"), Card::new("b", "b")]);

        deck.previous(&progress);
        assert_eq!(deck.current_index(), Some(0));
    }

    #[test]
    fn previous_skips_completed_and_never_first_cards() {
        let mut progress = ProgressTracker::new();
        let mut deck = DeckSequencer::new();
        deck.load(vec![
            Card::new("a", "a"),
            Card::new("b", "b"),
            Card::new("chained", "c").never_first(),
            Card::new("d", "d"),
        ]);
        deck.advance(&progress, None);
        deck.advance(&progress, None);
        assert_eq!(deck.current_card().map(|c| c.id.as_str()), Some("d"));

        progress.mark_correct("b");
        deck.previous(&progress);
        assert_eq!(deck.current_card().map(|c| c.id.as_str()), Some("a"));
    }

    #[test]
    fn previous_ignores_lives() {
        let mut progress = ProgressTracker::with_lives(1);
        let mut deck = DeckSequencer::new();
        deck.load(vec![Card::new("a", "a"), Card::new("b", "b")]);
        deck.advance(&progress, None);

        progress.mark_incorrect("zzz");
        deck.previous(&progress);
        assert_eq!(deck.current_index(), Some(0));
    }

    #[test]
    fn status_reports_bounds() {
        let progress = ProgressTracker::new();
        let mut deck = DeckSequencer::new();
        deck.load(vec![
            Card::new("s1", "s1").with_next("s2"),
            Card::new("s2", "s2").never_first(),
            Card::new("b", "b"),
        ]);

        let status = deck.status();
        assert_eq!(status.total_displayable, 2);
        assert_eq!(status.position, Some(0));
        assert!(status.has_next);
        assert!(!status.has_previous);

        deck.advance(&progress, None);
        deck.advance(&progress, None);
        let status = deck.status();
        assert_eq!(status.position, None);
        assert!(!status.has_next);
        assert!(!status.has_previous);
    }
}
