use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the random choices an attack or a round makes.
pub trait Dice: Send {
    /// Returns a value in `[0, upper)`. `upper` is always at least 1.
    fn roll(&mut self, upper: usize) -> usize;
}

pub struct RngDice<R: Rng + Send> {
    rng: R,
}

impl<R: Rng + Send> RngDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngDice<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> Dice for RngDice<R> {
    fn roll(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper.max(1))
    }
}

/// Replays a fixed sequence of rolls; values are reduced modulo `upper`.
/// Once the script runs out every roll yields 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<usize>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = usize>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, upper: usize) -> usize {
        let upper = upper.max(1);
        self.rolls.pop_front().map(|v| v % upper).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_dice_replays_in_order() {
        let mut dice = ScriptedDice::new([2, 1, 9]);
        assert_eq!(dice.roll(6), 2);
        assert_eq!(dice.roll(2), 1);
        assert_eq!(dice.roll(4), 1);
        assert_eq!(dice.roll(4), 0);
    }

    #[test]
    fn seeded_dice_stays_in_range_and_repeats() {
        let mut a = RngDice::seeded(7);
        let mut b = RngDice::seeded(7);
        for upper in 1..50 {
            let x = a.roll(upper);
            assert!(x < upper);
            assert_eq!(x, b.roll(upper));
        }
    }
}
