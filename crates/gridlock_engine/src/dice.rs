//! Per-color dice with configurable face multisets.

use crate::{Color, PerColor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::instrument;

/// Progress of the current turn's dice roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum DiceState {
    /// No roll has started this turn.
    #[default]
    NotRolled,
    /// `DiceRollStarted` was emitted; the value is not resolved yet.
    Rolling,
    /// The value for this turn.
    Rolled(u8),
}

impl DiceState {
    /// Resolved value, if any.
    pub fn value(self) -> Option<u8> {
        match self {
            DiceState::Rolled(value) => Some(value),
            _ => None,
        }
    }

    /// True once a roll has started, resolved or not.
    pub fn is_started(self) -> bool {
        !matches!(self, DiceState::NotRolled)
    }
}

/// Identifies one started roll within a match.
///
/// Ids increase for the life of an engine and are never reused, including
/// across [`crate::Engine::start_game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("roll #{_0}")]
pub struct RollId(pub(crate) u64);

/// Outcome of starting a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceRoll {
    /// This roll is in flight; resolve it after the configured delay.
    Pending(RollId),
    /// The turn already has this value.
    Resolved(u8),
}

/// Random source plus each color's face multiset.
#[derive(Debug, Clone)]
pub struct Dice {
    rng: StdRng,
    faces: PerColor<Vec<u8>>,
}

impl Dice {
    /// Creates dice from face lists, seeded for reproducibility when `seed`
    /// is given.
    pub fn new(faces: PerColor<Vec<u8>>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, faces }
    }

    /// Faces of `color`'s die.
    pub fn faces(&self, color: Color) -> &[u8] {
        self.faces.get(color)
    }

    /// Draws one face uniformly from `color`'s multiset.
    ///
    /// `None` only if the face list is empty.
    #[instrument(skip(self))]
    pub fn roll(&mut self, color: Color) -> Option<u8> {
        self.faces.get(color).choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_face_is_deterministic() {
        let mut dice = Dice::new(PerColor::new(vec![4], vec![2, 2]), None);
        for _ in 0..10 {
            assert_eq!(dice.roll(Color::Red), Some(4));
            assert_eq!(dice.roll(Color::Blue), Some(2));
        }
    }

    #[test]
    fn test_seeded_dice_repeat() {
        let faces = PerColor::new(vec![1, 2, 3, 4, 5, 6], vec![1, 2, 3, 4, 5, 6]);
        let mut a = Dice::new(faces.clone(), Some(7));
        let mut b = Dice::new(faces, Some(7));
        let left: Vec<_> = (0..20).map(|_| a.roll(Color::Red)).collect();
        let right: Vec<_> = (0..20).map(|_| b.roll(Color::Red)).collect();
        assert_eq!(left, right);
        assert!(left.iter().all(|v| matches!(v, Some(1..=6))));
    }

    #[test]
    fn test_empty_faces() {
        let mut dice = Dice::new(PerColor::new(vec![], vec![3]), Some(1));
        assert_eq!(dice.roll(Color::Red), None);
    }

    #[test]
    fn test_state_accessors() {
        assert_eq!(DiceState::Rolled(5).value(), Some(5));
        assert_eq!(DiceState::Rolling.value(), None);
        assert!(DiceState::Rolling.is_started());
        assert!(!DiceState::NotRolled.is_started());
    }
}
