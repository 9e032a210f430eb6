use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// A multiple-choice option in display order, remembering where it was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShuffledOption {
    pub value: String,
    pub original_index: usize,
}

impl ShuffledOption {
    pub fn is_correct(&self) -> bool {
        self.original_index == 0
    }
}

/// Uniformly permutes `options` for display.
///
/// `SliceRandom::shuffle` is a Fisher–Yates shuffle; comparator-based
/// "random sorts" are biased and must not be used here.
pub fn shuffle_options<R: Rng + ?Sized>(options: &[String], rng: &mut R) -> Vec<ShuffledOption> {
    let mut shuffled: Vec<ShuffledOption> = options
        .iter()
        .enumerate()
        .map(|(original_index, value)| ShuffledOption {
            value: value.clone(),
            original_index,
        })
        .collect();
    shuffled.shuffle(rng);
    shuffled
}
