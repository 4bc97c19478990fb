//! Error type shared by the board, the pathfinder, and the engine.

use crate::{Color, Coord, Phase, RollId};

/// Rejection of an engine or board operation.
///
/// Every rejection leaves the state exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// The match has a winner; no further mutations are accepted.
    #[display("Game is already over")]
    GameOver,

    /// The dice have not resolved a value this turn.
    #[display("Dice must be rolled before acting this turn")]
    DiceNotRolled,

    /// The roll being resolved was superseded by a restart or a newer roll.
    #[display("Dice {_0} is no longer in flight")]
    StaleDiceRoll(RollId),

    /// The operation is not legal in the current phase.
    #[display("Operation requires phase {expected}, but phase is {actual}")]
    WrongPhase {
        /// Phase the operation needs.
        expected: Phase,
        /// Phase the match is in.
        actual: Phase,
    },

    /// The coordinate does not denote an editable slot of the right kind.
    #[display("Coordinate {_0} is not valid for this operation")]
    InvalidCoordinate(Coord),

    /// The color already has the maximum number of active walls.
    #[display("{_0} already has the maximum number of active walls")]
    WallBudgetExceeded(Color),

    /// The edge orientation belongs to the other color.
    #[display("{color} may not edit the edge at {coord}")]
    WrongColorForEdge {
        /// Acting color.
        color: Color,
        /// Edge that was targeted.
        coord: Coord,
    },

    /// The edge already holds the acting color's wall.
    #[display("Edge {_0} already holds a wall")]
    WallAlreadyPresent(Coord),

    /// The edge holds no wall of the acting color.
    #[display("Edge {_0} holds no removable wall")]
    NoWallAtEdge(Coord),

    /// The destination is not a single unobstructed hop away.
    #[display("Illegal move from {from} to {to}")]
    IllegalMove {
        /// Current location.
        from: Coord,
        /// Requested destination.
        to: Coord,
    },

    /// A color has no path from its location to its goal.
    #[display("{_0} has no path to its goal")]
    ConnectivityViolation(Color),

    /// Movements or wall edits exceed what the dice value allows.
    #[display(
        "Turn budget exceeded: dice {dice}, {movements} movements, {wall_edits} wall edits"
    )]
    TurnBudgetExceeded {
        /// Resolved dice value (0 if never rolled).
        dice: u8,
        /// Movements made this turn.
        movements: u32,
        /// Edges changed since the start of the turn.
        wall_edits: usize,
    },

    /// The coordinate is not a cell slot.
    #[display("Coordinate {_0} is not a cell")]
    NotACellSlot(Coord),

    /// Two boards of different dimensions were compared.
    #[display("Boards have different dimensions")]
    DimensionMismatch,

    /// The match configuration is unusable.
    #[display("Invalid game configuration: {_0}")]
    InvalidConfig(String),
}

impl GameError {
    /// Stable machine-readable identifier for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::GameOver => "game_over",
            GameError::DiceNotRolled => "dice_not_rolled",
            GameError::StaleDiceRoll(_) => "stale_dice_roll",
            GameError::WrongPhase { .. } => "wrong_phase",
            GameError::InvalidCoordinate(_) => "invalid_coordinate",
            GameError::WallBudgetExceeded(_) => "wall_budget_exceeded",
            GameError::WrongColorForEdge { .. } => "wrong_color_for_edge",
            GameError::WallAlreadyPresent(_) => "wall_already_present",
            GameError::NoWallAtEdge(_) => "no_wall_at_edge",
            GameError::IllegalMove { .. } => "illegal_move",
            GameError::ConnectivityViolation(_) => "connectivity_violation",
            GameError::TurnBudgetExceeded { .. } => "turn_budget_exceeded",
            GameError::NotACellSlot(_) => "not_a_cell_slot",
            GameError::DimensionMismatch => "dimension_mismatch",
            GameError::InvalidConfig(_) => "invalid_config",
        }
    }
}

impl std::error::Error for GameError {}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = GameError::WrongColorForEdge {
            color: Color::Blue,
            coord: Coord::new(1, 2),
        };
        assert_eq!(err.to_string(), "blue may not edit the edge at (1, 2)");
        assert_eq!(err.code(), "wrong_color_for_edge");
    }

    #[test]
    fn test_turn_budget_message() {
        let err = GameError::TurnBudgetExceeded {
            dice: 3,
            movements: 1,
            wall_edits: 5,
        };
        assert!(err.to_string().contains("dice 3"));
        assert!(err.to_string().contains("5 wall edits"));
    }

    #[test]
    fn test_stale_roll_names_the_roll() {
        let err = GameError::StaleDiceRoll(RollId(3));
        assert_eq!(err.to_string(), "Dice roll #3 is no longer in flight");
        assert_eq!(err.code(), "stale_dice_roll");
    }
}
