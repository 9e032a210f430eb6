use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::card_source::{track_fetch, CardSource};
use super::study_session::StudySession;
use crate::error::StudyResult;
use crate::metrics::SESSIONS_TOTAL;
use crate::models::card::Card;

pub const DEFAULT_SESSION_SIZE: usize = 10;

/// Fetches a card pool and turns it into a shuffled, capped session deck.
pub struct SessionBuilder {
    source: Arc<dyn CardSource>,
    session_size: usize,
    starting_lives: u32,
}

impl SessionBuilder {
    pub fn new(source: Arc<dyn CardSource>, session_size: usize, starting_lives: u32) -> Self {
        Self {
            source,
            session_size,
            starting_lives,
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Returns the ordered deck for a new session; an empty pool yields an empty deck.
    pub async fn build_session(&self, category: &str, folders: &[String]) -> StudyResult<Vec<Card>> {
        tracing::info!(
            "Building study session: category={}, folders={:?}, source={}",
            category,
            folders,
            self.source.name()
        );

        let pool = track_fetch(
            self.source.name(),
            self.source.fetch_cards(category, folders),
        )
        .await
        .inspect_err(|e| tracing::error!("Failed to load flashcards: {}", e))?;

        if pool.is_empty() {
            tracing::warn!("No flashcards found for category={}", category);
            return Ok(Vec::new());
        }

        let pool_size = pool.len();
        let deck = prepare_deck(pool, self.session_size, &mut rand::rng());
        tracing::info!(
            "Built deck of {} cards ({} displayable) from pool of {}",
            deck.len(),
            deck.iter().filter(|card| card.is_displayable()).count(),
            pool_size
        );

        Ok(deck)
    }

    /// Builds a deck and wraps it in a fresh session with full lives.
    pub async fn start_session(&self, category: &str, folders: &[String]) -> StudyResult<StudySession> {
        let deck = self.build_session(category, folders).await?;
        let status = if deck.is_empty() { "empty" } else { "started" };
        SESSIONS_TOTAL.with_label_values(&[status]).inc();

        Ok(StudySession::new(
            Some(category.to_string()),
            folders.to_vec(),
            deck,
            self.starting_lives,
        ))
    }
}

/// Shuffles chain units uniformly and keeps at most `session_size` of them.
///
/// Each unit is a displayable head followed by the cards its `next_card_id`
/// links lead to, so chain steps always sit right after their predecessor.
pub fn prepare_deck<R: Rng + ?Sized>(pool: Vec<Card>, session_size: usize, rng: &mut R) -> Vec<Card> {
    let mut units = chain_units(pool);
    units.shuffle(rng);
    units.truncate(session_size);
    units.into_iter().flatten().collect()
}

/// Groups a pool into chains. Every displayable card lands in exactly one
/// unit; `never_display_first` cards no chain reaches are dropped.
pub fn chain_units(pool: Vec<Card>) -> Vec<Vec<Card>> {
    let referenced: HashSet<String> = pool
        .iter()
        .filter_map(|card| card.next_card_id.clone())
        .collect();

    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    for (index, card) in pool.iter().enumerate() {
        index_by_id.entry(card.id.clone()).or_insert(index);
    }

    // Unreferenced displayable cards head their chains. Displayable cards
    // that are still unplaced afterwards (cycles, or links from cards that
    // are never shown) head a chain of their own in a second pass.
    let (heads, linked): (Vec<usize>, Vec<usize>) = pool
        .iter()
        .enumerate()
        .filter(|(_, card)| card.is_displayable())
        .map(|(index, _)| index)
        .partition(|&index| !referenced.contains(&pool[index].id));

    let mut slots: Vec<Option<Card>> = pool.into_iter().map(Some).collect();
    let mut units = Vec::with_capacity(heads.len());

    for head in heads.into_iter().chain(linked) {
        if slots[head].is_none() {
            continue;
        }

        let mut unit = Vec::new();
        let mut next = Some(head);

        // A taken slot means a cycle or a duplicate id; stop walking.
        while let Some(index) = next {
            let Some(card) = slots[index].take() else {
                break;
            };
            next = card
                .next_card_id
                .as_deref()
                .and_then(|id| index_by_id.get(id).copied());
            unit.push(card);
        }

        units.push(unit);
    }

    let orphaned: Vec<&str> = slots.iter().flatten().map(|card| card.id.as_str()).collect();
    if !orphaned.is_empty() {
        tracing::warn!("Dropping unreachable chained cards: {:?}", orphaned);
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::study::Answer;
    use crate::services::card_source::StaticCardSource;
    use crate::error::StudyError;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct FailingSource;

    #[async_trait]
    impl CardSource for FailingSource {
        async fn fetch_cards(&self, _category: &str, _folders: &[String]) -> StudyResult<Vec<Card>> {
            Err(StudyError::FetchFailure("connection refused".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn trig_chain(prefix: &str) -> Vec<Card> {
        vec![
            Card::new(format!("{prefix}1"), "convert to radians")
                .with_options(["π/6", "π/4"])
                .with_next(format!("{prefix}2"))
                .with_step(1, 3),
            Card::new(format!("{prefix}2"), "cosine")
                .with_options(["√3/2", "1/2"])
                .with_next(format!("{prefix}3"))
                .never_first()
                .with_step(2, 3),
            Card::new(format!("{prefix}3"), "sine")
                .with_options(["1/2", "√3/2"])
                .never_first()
                .with_step(3, 3),
        ]
    }

    fn mixed_pool() -> Vec<Card> {
        let mut pool = vec![
            Card::new("def1", "Define sine").with_back("opposite / hypotenuse"),
            Card::new("def2", "Define cosine").with_back("adjacent / hypotenuse"),
            Card::new("mc1", "2+2?").with_options(["4", "3"]),
        ];
        pool.extend(trig_chain("t30-"));
        pool.extend(trig_chain("t45-"));
        pool
    }

    fn ids(cards: &[Card]) -> Vec<&str> {
        cards.iter().map(|card| card.id.as_str()).collect()
    }

    #[test]
    fn chain_units_keep_steps_in_order() {
        let units = chain_units(mixed_pool());
        assert_eq!(units.len(), 5);

        let chain = units
            .iter()
            .find(|unit| unit[0].id == "t30-1")
            .unwrap();
        assert_eq!(ids(chain), vec!["t30-1", "t30-2", "t30-3"]);
    }

    #[test]
    fn chain_units_drop_orphans_and_survive_cycles() {
        let pool = vec![
            Card::new("a", "a").with_next("b"),
            Card::new("b", "b").with_next("a").never_first(),
            Card::new("orphan", "o").never_first(),
        ];
        let units = chain_units(pool);
        assert_eq!(units.len(), 1);
        assert_eq!(ids(&units[0]), vec!["a", "b"]);
    }

    #[test]
    fn displayable_card_linked_only_from_orphan_keeps_its_chain() {
        let pool = vec![
            Card::new("orphan", "o").with_next("x").never_first(),
            Card::new("x", "x").with_next("y"),
            Card::new("y", "y").never_first(),
            Card::new("z", "z"),
        ];
        let units = chain_units(pool);

        let unit_ids: Vec<Vec<&str>> = units.iter().map(|unit| ids(unit)).collect();
        assert_eq!(unit_ids, vec![vec!["z"], vec!["x", "y"]]);
    }

    #[test]
    fn prepare_deck_keeps_every_card_of_a_cycle() {
        let pool = vec![
            Card::new("a", "a").with_next("b"),
            Card::new("b", "b").with_next("a"),
        ];
        let deck = prepare_deck(pool, DEFAULT_SESSION_SIZE, &mut StdRng::seed_from_u64(7));
        assert_eq!(ids(&deck), vec!["a", "b"]);
    }

    #[test]
    fn prepare_deck_starts_with_displayable_card() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let deck = prepare_deck(mixed_pool(), DEFAULT_SESSION_SIZE, &mut rng);
            assert_eq!(deck.len(), 9);
            assert!(deck[0].is_displayable());
        }
    }

    #[test]
    fn prepare_deck_caps_units_not_steps() {
        let mut rng = StdRng::seed_from_u64(3);
        let deck = prepare_deck(mixed_pool(), 2, &mut rng);

        let displayable = deck.iter().filter(|card| card.is_displayable()).count();
        assert_eq!(displayable, 2);
        for (index, card) in deck.iter().enumerate() {
            if let Some(next) = &card.next_card_id {
                assert_eq!(&deck[index + 1].id, next);
            }
        }
    }

    #[test]
    fn prepare_deck_caps_plain_cards_at_ten() {
        let pool: Vec<Card> = (0..25)
            .map(|n| Card::new(format!("c{n}"), format!("question {n}")))
            .collect();
        let mut rng = StdRng::seed_from_u64(11);

        let deck = prepare_deck(pool, DEFAULT_SESSION_SIZE, &mut rng);
        assert_eq!(deck.len(), DEFAULT_SESSION_SIZE);
    }

    #[test]
    fn prepare_deck_varies_order_across_seeds() {
        let pool: Vec<Card> = (0..8)
            .map(|n| Card::new(format!("c{n}"), format!("question {n}")))
            .collect();

        let first: Vec<String> = prepare_deck(pool.clone(), 8, &mut StdRng::seed_from_u64(1))
            .into_iter()
            .map(|card| card.id)
            .collect();
        let differs = (2..20).any(|seed| {
            let other: Vec<String> = prepare_deck(pool.clone(), 8, &mut StdRng::seed_from_u64(seed))
                .into_iter()
                .map(|card| card.id)
                .collect();
            other != first
        });
        assert!(differs);
    }

    #[tokio::test]
    async fn empty_pool_builds_completed_session() {
        let builder = SessionBuilder::new(Arc::new(StaticCardSource::new()), 10, 3);

        let session = builder.start_session("Math", &["4.1".to_string()]).await.unwrap();
        assert!(session.is_complete());
        assert_eq!(session.progress().displayable_total, 0);
        assert_eq!(session.progress().correct_count, 0);
    }

    #[tokio::test]
    async fn fetch_failure_is_reported() {
        let builder = SessionBuilder::new(Arc::new(FailingSource), 10, 3);

        let err = builder.start_session("Math", &[]).await.unwrap_err();
        assert!(matches!(err, StudyError::FetchFailure(_)));
    }

    #[tokio::test]
    async fn round_trip_visits_every_card_once() {
        let source = StaticCardSource::new().with_category("math", mixed_pool());
        let builder = SessionBuilder::new(Arc::new(source), 10, 3);

        let mut session = builder.start_session("Math", &[]).await.unwrap();
        let mut visited = Vec::new();

        while let Some(card) = session.current_card().cloned() {
            assert!(!visited.contains(&card.id), "{} shown twice", card.id);
            visited.push(card.id.clone());

            let answer = if card.is_multiple_choice() {
                Answer::Choice { original_index: 0 }
            } else {
                Answer::SelfReport { correct: true }
            };
            session.answer(answer).unwrap();
        }

        visited.sort();
        let mut expected: Vec<String> = mixed_pool().into_iter().map(|card| card.id).collect();
        expected.sort();
        assert_eq!(visited, expected);
    }
}
