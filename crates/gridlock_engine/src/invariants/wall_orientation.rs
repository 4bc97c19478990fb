//! Wall orientation: red walls are vertical, blue walls are horizontal.

use super::Invariant;
use crate::{Color, EdgeState, GameState};

/// Invariant: every listed wall sits on its color's orientation and is
/// present on the live board, and every locked wall is still locked.
pub struct WallOrientationInvariant;

impl Invariant<GameState> for WallOrientationInvariant {
    fn holds(state: &GameState) -> bool {
        let board = state.current_board();
        let active_ok = [Color::Red, Color::Blue].into_iter().all(|color| {
            state.walls().active(color).iter().all(|wall| {
                wall.edge_orientation() == Some(color.wall_orientation())
                    && board.edge(*wall) == Some(EdgeState::Wall(color))
            })
        });
        let locked_ok = state
            .walls()
            .locked()
            .iter()
            .all(|wall| board.edge(*wall) == Some(EdgeState::Locked));
        active_ok && locked_ok
    }

    fn description() -> &'static str {
        "Walls match their color's orientation and the board"
    }
}
