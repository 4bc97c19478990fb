//! Preconditions for engine operations.
//!
//! Each check is pure over [`GameState`]. Composite checks run their parts in
//! the order the engine reports failures.

use crate::invariants::ConnectivityInvariant;
use crate::{
    Coord, DiceState, EdgeState, GameError, GameState, Phase, Result, MAX_ACTIVE_WALLS,
    TURN_BUDGET,
};
use tracing::instrument;

/// Precondition: the match has not ended.
pub struct NotGameOver;

impl NotGameOver {
    /// Fails with `GameOver` once a pawn has reached its goal.
    pub fn check(state: &GameState) -> Result<()> {
        if *state.game_over() {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: this turn's dice value has resolved.
pub struct DiceResolved;

impl DiceResolved {
    /// Fails with `DiceNotRolled` until the roll has a value.
    pub fn check(state: &GameState) -> Result<()> {
        match state.dice() {
            DiceState::Rolled(_) => Ok(()),
            _ => Err(GameError::DiceNotRolled),
        }
    }
}

/// Precondition: the match is in `expected`.
pub struct InPhase;

impl InPhase {
    /// Fails with `WrongPhase` outside `expected`.
    pub fn check(state: &GameState, expected: Phase) -> Result<()> {
        let actual = *state.phase();
        if actual == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase { expected, actual })
        }
    }
}

/// Precondition: `coord` is an interior, unlocked edge of the acting color's
/// orientation.
pub struct EditableEdge;

impl EditableEdge {
    /// Fails with `InvalidCoordinate` or `WrongColorForEdge`.
    #[instrument(skip(state))]
    pub fn check(state: &GameState, coord: Coord) -> Result<()> {
        let board = state.current_board();
        let Some(orientation) = coord.edge_orientation() else {
            return Err(GameError::InvalidCoordinate(coord));
        };
        if !board.is_interior_edge(coord) || board.edge(coord) == Some(EdgeState::Locked) {
            return Err(GameError::InvalidCoordinate(coord));
        }
        let color = *state.turn();
        if orientation != color.wall_orientation() {
            return Err(GameError::WrongColorForEdge { color, coord });
        }
        Ok(())
    }
}

/// Precondition: the acting color may place another wall.
pub struct WallCapacity;

impl WallCapacity {
    /// Fails with `WallBudgetExceeded` at the cap.
    pub fn check(state: &GameState) -> Result<()> {
        let color = *state.turn();
        if state.walls().active(color).len() >= MAX_ACTIVE_WALLS {
            Err(GameError::WallBudgetExceeded(color))
        } else {
            Ok(())
        }
    }
}

/// Precondition: `coord` does not already hold the acting color's wall.
pub struct EdgeIsEmpty;

impl EdgeIsEmpty {
    /// Fails with `WallAlreadyPresent`.
    pub fn check(state: &GameState, coord: Coord) -> Result<()> {
        match state.current_board().edge(coord) {
            Some(EdgeState::Empty) => Ok(()),
            _ => Err(GameError::WallAlreadyPresent(coord)),
        }
    }
}

/// Precondition: `coord` holds the acting color's wall.
pub struct EdgeHasOwnWall;

impl EdgeHasOwnWall {
    /// Fails with `NoWallAtEdge`.
    pub fn check(state: &GameState, coord: Coord) -> Result<()> {
        let color = *state.turn();
        match state.current_board().edge(coord) {
            Some(EdgeState::Wall(owner)) if owner == color => Ok(()),
            _ => Err(GameError::NoWallAtEdge(coord)),
        }
    }
}

/// Precondition: `to` is one unobstructed cell hop from the acting pawn.
pub struct OneHop;

impl OneHop {
    /// Fails with `IllegalMove`.
    #[instrument(skip(state))]
    pub fn check(state: &GameState, to: Coord) -> Result<()> {
        let from = state.player_location(*state.turn());
        if state.current_board().can_hop(from, to) {
            Ok(())
        } else {
            Err(GameError::IllegalMove { from, to })
        }
    }
}

/// Precondition: both colors can reach their goals.
pub struct BothConnected;

impl BothConnected {
    /// Fails with `ConnectivityViolation` naming the first cut-off color.
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<()> {
        match ConnectivityInvariant::first_disconnected(state) {
            Some(color) => Err(GameError::ConnectivityViolation(color)),
            None => Ok(()),
        }
    }
}

/// Precondition: movements and wall edits fit the dice value.
pub struct WithinTurnBudget;

impl WithinTurnBudget {
    /// Movements allowed for a dice value.
    pub fn movement_allowance(dice: u8) -> u32 {
        u32::from(dice)
    }

    /// Wall edits allowed for a dice value.
    pub fn edit_allowance(dice: u8) -> usize {
        usize::from(TURN_BUDGET.saturating_sub(dice))
    }

    /// Fails with `TurnBudgetExceeded`.
    pub fn check(state: &GameState) -> Result<()> {
        let dice = state.dice_value();
        let movements = *state.movement_count();
        let wall_edits = *state.wall_edit_count();
        if movements <= Self::movement_allowance(dice) && wall_edits <= Self::edit_allowance(dice)
        {
            Ok(())
        } else {
            Err(GameError::TurnBudgetExceeded {
                dice,
                movements,
                wall_edits,
            })
        }
    }
}

/// Composite precondition for `add_edge`.
pub struct LegalWallPlacement;

impl LegalWallPlacement {
    /// Runs every `add_edge` precondition in order.
    #[instrument(skip(state))]
    pub fn check(state: &GameState, coord: Coord) -> Result<()> {
        NotGameOver::check(state)?;
        DiceResolved::check(state)?;
        InPhase::check(state, Phase::PlacingWalls)?;
        EditableEdge::check(state, coord)?;
        WallCapacity::check(state)?;
        EdgeIsEmpty::check(state, coord)?;
        Ok(())
    }
}

/// Composite precondition for `remove_edge`.
pub struct LegalWallRemoval;

impl LegalWallRemoval {
    /// Runs every `remove_edge` precondition in order.
    #[instrument(skip(state))]
    pub fn check(state: &GameState, coord: Coord) -> Result<()> {
        NotGameOver::check(state)?;
        DiceResolved::check(state)?;
        InPhase::check(state, Phase::PlacingWalls)?;
        EditableEdge::check(state, coord)?;
        EdgeHasOwnWall::check(state, coord)?;
        Ok(())
    }
}

/// Composite precondition for `lock_walls`.
///
/// The turn budget is not checked here; it applies only at `switch_turn`.
pub struct LegalLock;

impl LegalLock {
    /// Runs every `lock_walls` precondition in order.
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<()> {
        NotGameOver::check(state)?;
        DiceResolved::check(state)?;
        BothConnected::check(state)?;
        Ok(())
    }
}

/// Composite precondition for `set_player_location`.
pub struct LegalMove;

impl LegalMove {
    /// Runs every `set_player_location` precondition in order.
    #[instrument(skip(state))]
    pub fn check(state: &GameState, to: Coord) -> Result<()> {
        NotGameOver::check(state)?;
        DiceResolved::check(state)?;
        InPhase::check(state, Phase::MovingPlayer)?;
        OneHop::check(state, to)?;
        Ok(())
    }
}

/// Composite precondition for `switch_turn`.
///
/// A turn may end without a roll, in which case the dice value counts as 0,
/// but not while a roll is in flight.
pub struct LegalSwitch;

impl LegalSwitch {
    /// Runs every `switch_turn` precondition in order.
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<()> {
        NotGameOver::check(state)?;
        if *state.dice() == DiceState::Rolling {
            return Err(GameError::DiceNotRolled);
        }
        BothConnected::check(state)?;
        WithinTurnBudget::check(state)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, GameConfig};

    fn fresh() -> GameState {
        GameState::from_config(&GameConfig::default()).unwrap()
    }

    #[test]
    fn test_allowances_are_coupled() {
        for dice in 1..=6u8 {
            assert_eq!(
                WithinTurnBudget::movement_allowance(dice) as usize
                    + WithinTurnBudget::edit_allowance(dice),
                usize::from(TURN_BUDGET)
            );
        }
    }

    #[test]
    fn test_placement_requires_roll() {
        let state = fresh();
        assert_eq!(
            LegalWallPlacement::check(&state, Coord::new(1, 2)),
            Err(GameError::DiceNotRolled)
        );
    }

    #[test]
    fn test_editable_edge_order() {
        let mut state = fresh();
        state.set_dice(DiceState::Rolled(3));
        // Corner.
        assert_eq!(
            EditableEdge::check(&state, Coord::new(2, 2)),
            Err(GameError::InvalidCoordinate(Coord::new(2, 2)))
        );
        // Border edge.
        assert_eq!(
            EditableEdge::check(&state, Coord::new(1, 0)),
            Err(GameError::InvalidCoordinate(Coord::new(1, 0)))
        );
        // Horizontal edge on red's turn.
        assert_eq!(
            EditableEdge::check(&state, Coord::new(2, 1)),
            Err(GameError::WrongColorForEdge {
                color: Color::Red,
                coord: Coord::new(2, 1)
            })
        );
        assert_eq!(EditableEdge::check(&state, Coord::new(1, 2)), Ok(()));
    }

    #[test]
    fn test_switch_without_roll_passes_when_idle() {
        let state = fresh();
        assert_eq!(LegalSwitch::check(&state), Ok(()));
    }

    #[test]
    fn test_switch_rejected_while_rolling() {
        let mut state = fresh();
        state.set_dice(DiceState::Rolling);
        assert_eq!(LegalSwitch::check(&state), Err(GameError::DiceNotRolled));
    }
}
