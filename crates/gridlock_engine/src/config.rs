//! Match setup: board size, placements, dice and timing.

use crate::{has_path, Board, Color, Coord, EdgeState, GameError, PerColor, Result};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

/// Everything [`crate::Engine::start_game`] rebuilds a match from.
///
/// Start, goal and locked-wall positions are grid coordinates. Missing
/// fields in serialized form take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct GameConfig {
    /// Width in cells.
    width: u16,
    /// Height in cells.
    height: u16,
    /// Color that acts first.
    starting_color: Color,
    /// Initial pawn cells.
    start: PerColor<Coord>,
    /// Destination cells.
    goal: PerColor<Coord>,
    /// Walls fixed for the life of the match.
    locked_walls: Vec<Coord>,
    /// Face multiset of each color's die.
    dice_faces: PerColor<Vec<u8>>,
    /// Pause between `DiceRollStarted` and `DiceRollResolved`.
    dice_delay_ms: u64,
    /// Seed for reproducible dice.
    seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let d6 = vec![1, 2, 3, 4, 5, 6];
        Self {
            width: 5,
            height: 5,
            starting_color: Color::Red,
            start: PerColor::new(Coord::cell(0, 2), Coord::cell(2, 0)),
            goal: PerColor::new(Coord::cell(4, 2), Coord::cell(2, 4)),
            locked_walls: Vec::new(),
            dice_faces: PerColor::new(d6.clone(), d6),
            dice_delay_ms: 1000,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Config for a `width` × `height` board with the given placements and
    /// otherwise default settings.
    pub fn with_board(
        width: u16,
        height: u16,
        start: PerColor<Coord>,
        goal: PerColor<Coord>,
    ) -> Self {
        Self {
            width,
            height,
            start,
            goal,
            ..Self::default()
        }
    }

    /// Replaces the first color to act.
    pub fn starting_with(mut self, color: Color) -> Self {
        self.starting_color = color;
        self
    }

    /// Replaces the locked walls.
    pub fn locked(mut self, walls: Vec<Coord>) -> Self {
        self.locked_walls = walls;
        self
    }

    /// Replaces both die face lists.
    pub fn dice(mut self, red: Vec<u8>, blue: Vec<u8>) -> Self {
        self.dice_faces = PerColor::new(red, blue);
        self
    }

    /// Replaces the dice delay.
    pub fn delay_ms(mut self, millis: u64) -> Self {
        self.dice_delay_ms = millis;
        self
    }

    /// Fixes the dice seed.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Dice delay as a [`Duration`].
    pub fn dice_delay(&self) -> Duration {
        Duration::from_millis(self.dice_delay_ms)
    }

    /// Checks that the config describes a playable match.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the first problem found.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid("board dimensions must be positive"));
        }
        if self.width > 1000 || self.height > 1000 {
            return Err(invalid("board dimensions must not exceed 1000 cells"));
        }
        let board = Board::new(self.width, self.height);

        for color in [Color::Red, Color::Blue] {
            let start = *self.start.get(color);
            let goal = *self.goal.get(color);
            if !start.is_cell() || !board.contains(start) {
                return Err(invalid(format!("{color} start {start} is not a cell")));
            }
            if !goal.is_cell() || !board.contains(goal) {
                return Err(invalid(format!("{color} goal {goal} is not a cell")));
            }
            if start == goal {
                return Err(invalid(format!("{color} starts on its goal")));
            }
            let faces = self.dice_faces.get(color);
            if faces.is_empty() {
                return Err(invalid(format!("{color} die has no faces")));
            }
            if let Some(face) = faces.iter().find(|face| !(1..=6).contains(*face)) {
                return Err(invalid(format!("{color} die face {face} is outside 1..=6")));
            }
        }

        if let Some(wall) = self
            .locked_walls
            .iter()
            .find(|wall| !board.is_interior_edge(**wall))
        {
            return Err(invalid(format!("locked wall {wall} is not an interior edge")));
        }

        let mut board = board;
        for wall in &self.locked_walls {
            board.set_edge(*wall, EdgeState::Locked)?;
        }
        for color in [Color::Red, Color::Blue] {
            if !has_path(&board, *self.start.get(color), *self.goal.get(color)) {
                return Err(invalid(format!(
                    "locked walls cut {color} off from its goal"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> GameError {
    GameError::InvalidConfig(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(*config.width(), 5);
        assert_eq!(config.dice_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let config = GameConfig::with_board(
            0,
            3,
            PerColor::new(Coord::cell(0, 0), Coord::cell(0, 0)),
            PerColor::new(Coord::cell(2, 0), Coord::cell(2, 0)),
        );
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_non_cell_start() {
        let config = GameConfig::with_board(
            3,
            3,
            PerColor::new(Coord::new(1, 2), Coord::cell(0, 0)),
            PerColor::new(Coord::cell(2, 0), Coord::cell(2, 2)),
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("red start"));
    }

    #[test]
    fn test_rejects_bad_faces_and_border_walls() {
        let bad_face = GameConfig::default().dice(vec![0, 1], vec![1]);
        assert!(bad_face.validate().is_err());

        let empty = GameConfig::default().dice(vec![1], vec![]);
        assert!(empty.validate().is_err());

        let border = GameConfig::default().locked(vec![Coord::new(1, 0)]);
        assert!(border.validate().is_err());

        let interior = GameConfig::default().locked(vec![Coord::new(1, 2)]);
        assert_eq!(interior.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_locked_walls_that_seal_a_goal() {
        // Blue's goal cell (2,4) fenced on its three open sides.
        let sealed = GameConfig::default().locked(vec![
            Coord::new(4, 9),
            Coord::new(6, 9),
            Coord::new(5, 8),
        ]);
        let err = sealed.validate().unwrap_err();
        assert!(err.to_string().contains("cut blue off"));

        let fenced_twice = GameConfig::default().locked(vec![Coord::new(4, 9), Coord::new(6, 9)]);
        assert_eq!(fenced_twice.validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"width": 7, "height": 7, "dice_delay_ms": 0}"#).unwrap();
        assert_eq!(*config.width(), 7);
        assert_eq!(*config.dice_delay_ms(), 0);
        assert_eq!(*config.starting_color(), Color::Red);
    }
}
