//! Wall cap: no color holds more than six active walls.

use super::Invariant;
use crate::{Color, GameState, MAX_ACTIVE_WALLS};

/// Invariant: each color's active wall list is within the cap and matches
/// the number of that color's walls on the live board.
pub struct WallCapInvariant;

impl Invariant<GameState> for WallCapInvariant {
    fn holds(state: &GameState) -> bool {
        [Color::Red, Color::Blue].into_iter().all(|color| {
            let listed = state.walls().active(color).len();
            listed <= MAX_ACTIVE_WALLS && state.current_board().count_walls(color) == listed
        })
    }

    fn description() -> &'static str {
        "Each color has at most six active walls"
    }
}
