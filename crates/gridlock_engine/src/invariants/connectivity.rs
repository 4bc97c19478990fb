//! Connectivity: both pawns can still reach their goals.

use super::Invariant;
use crate::{has_path, Color, GameState};

/// Invariant: each color has a path from its pawn to its goal on the live
/// board.
pub struct ConnectivityInvariant;

impl ConnectivityInvariant {
    /// First color without a path, if any.
    pub fn first_disconnected(state: &GameState) -> Option<Color> {
        [Color::Red, Color::Blue].into_iter().find(|color| {
            !has_path(
                state.current_board(),
                state.player_location(*color),
                state.goal_location(*color),
            )
        })
    }
}

impl Invariant<GameState> for ConnectivityInvariant {
    fn holds(state: &GameState) -> bool {
        Self::first_disconnected(state).is_none()
    }

    fn description() -> &'static str {
        "Both colors have a path to their goal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coord, EdgeState, GameConfig, PerColor};

    #[test]
    fn test_sealed_goal_violates() {
        // Red races down column 0 of a 2x2 board; blue along row 1.
        let config = GameConfig::with_board(
            2,
            2,
            PerColor::new(Coord::cell(0, 0), Coord::cell(1, 0)),
            PerColor::new(Coord::cell(1, 1), Coord::cell(0, 1)),
        );
        let mut state = GameState::from_config(&config).unwrap();
        assert!(ConnectivityInvariant::holds(&state));

        // Cut the board into top and bottom rows.
        let board = state.current_board_mut();
        board.set_edge(Coord::new(2, 1), EdgeState::Locked).unwrap();
        board.set_edge(Coord::new(2, 3), EdgeState::Locked).unwrap();

        assert_eq!(
            ConnectivityInvariant::first_disconnected(&state),
            Some(Color::Red)
        );
        assert!(!ConnectivityInvariant::holds(&state));
    }
}
