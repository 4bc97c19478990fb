//! Authoritative match state owned by the engine.

use crate::{
    Board, Color, Coord, DiceState, EdgeState, GameConfig, Occupant, PerColor, Phase, Result,
};
use derive_getters::Getters;
use serde::Serialize;
use tracing::instrument;

/// Maximum active (removable) walls per color.
pub const MAX_ACTIVE_WALLS: usize = 6;

/// Movements plus wall edits allowed per turn; a dice value `d` grants `d`
/// movements and `TURN_BUDGET - d` edits.
pub const TURN_BUDGET: u8 = 7;

/// Active walls per color plus the locked walls fixed at setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Getters)]
pub struct WallLocations {
    red: Vec<Coord>,
    blue: Vec<Coord>,
    locked: Vec<Coord>,
}

impl WallLocations {
    /// Empty active lists around the given locked walls.
    pub fn with_locked(locked: Vec<Coord>) -> Self {
        Self {
            red: Vec::new(),
            blue: Vec::new(),
            locked,
        }
    }

    /// Active walls of `color`.
    pub fn active(&self, color: Color) -> &[Coord] {
        match color {
            Color::Red => &self.red,
            Color::Blue => &self.blue,
        }
    }

    pub(crate) fn active_mut(&mut self, color: Color) -> &mut Vec<Coord> {
        match color {
            Color::Red => &mut self.red,
            Color::Blue => &mut self.blue,
        }
    }
}

/// Everything that changes over a match.
#[derive(Debug, Clone, Serialize, Getters)]
pub struct GameState {
    /// Color acting now.
    turn: Color,
    /// Current turn phase.
    phase: Phase,
    /// Set once a pawn reaches its goal.
    game_over: bool,
    /// This turn's roll.
    dice: DiceState,
    /// Width in cells.
    width: u16,
    /// Height in cells.
    height: u16,
    /// Pawn locations.
    players: PerColor<Coord>,
    /// Goal locations.
    goals: PerColor<Coord>,
    /// Wall lists.
    walls: WallLocations,
    /// Board at the start of the turn.
    #[serde(skip)]
    old_board: Board,
    /// Live board.
    #[serde(skip)]
    current_board: Board,
    /// Hops made this turn.
    movement_count: u32,
    /// Edges differing between `current_board` and `old_board`.
    wall_edit_count: usize,
    /// Face multisets, for display.
    dice_faces: PerColor<Vec<u8>>,
}

impl GameState {
    /// Fresh state for a validated config.
    #[instrument(skip(config))]
    pub(crate) fn from_config(config: &GameConfig) -> Result<Self> {
        let walls = WallLocations::with_locked(config.locked_walls().clone());
        let board = build_board(
            *config.width(),
            *config.height(),
            config.start(),
            config.goal(),
            &walls,
        )?;
        Ok(Self {
            turn: *config.starting_color(),
            phase: Phase::PlacingWalls,
            game_over: false,
            dice: DiceState::NotRolled,
            width: *config.width(),
            height: *config.height(),
            players: config.start().clone(),
            goals: config.goal().clone(),
            walls,
            current_board: board.copy(),
            old_board: board,
            movement_count: 0,
            wall_edit_count: 0,
            dice_faces: config.dice_faces().clone(),
        })
    }

    /// Board rebuilt from locations and wall lists.
    pub(crate) fn rebuild_board(&self) -> Result<Board> {
        build_board(
            self.width,
            self.height,
            &self.players,
            &self.goals,
            &self.walls,
        )
    }

    /// Resolved dice value, or 0 before a roll.
    pub fn dice_value(&self) -> u8 {
        self.dice.value().unwrap_or(0)
    }

    /// Location of `color`'s pawn.
    pub fn player_location(&self, color: Color) -> Coord {
        *self.players.get(color)
    }

    /// Location of `color`'s goal.
    pub fn goal_location(&self, color: Color) -> Coord {
        *self.goals.get(color)
    }

    pub(crate) fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn set_game_over(&mut self) {
        self.game_over = true;
    }

    pub(crate) fn set_dice(&mut self, dice: DiceState) {
        self.dice = dice;
    }

    pub(crate) fn walls_mut(&mut self) -> &mut WallLocations {
        &mut self.walls
    }

    pub(crate) fn current_board_mut(&mut self) -> &mut Board {
        &mut self.current_board
    }

    pub(crate) fn move_player(&mut self, color: Color, to: Coord) {
        *self.players.get_mut(color) = to;
        self.movement_count += 1;
    }

    /// Recomputes the turn's edit count from the two boards.
    pub(crate) fn refresh_wall_edit_count(&mut self) -> Result<usize> {
        self.wall_edit_count = self.current_board.compare_edges(&self.old_board)?;
        Ok(self.wall_edit_count)
    }

    /// Starts a new turn for `next`.
    pub(crate) fn begin_turn(&mut self, next: Color) -> Result<()> {
        let fresh = self.rebuild_board()?;
        self.old_board = std::mem::replace(&mut self.current_board, fresh);
        self.turn = next;
        self.phase = Phase::PlacingWalls;
        self.dice = DiceState::NotRolled;
        self.movement_count = 0;
        self.wall_edit_count = 0;
        Ok(())
    }
}

fn build_board(
    width: u16,
    height: u16,
    players: &PerColor<Coord>,
    goals: &PerColor<Coord>,
    walls: &WallLocations,
) -> Result<Board> {
    let mut board = Board::new(width, height);
    for color in [Color::Red, Color::Blue] {
        board.add_occupant(*goals.get(color), Occupant::goal(color))?;
        board.add_occupant(*players.get(color), Occupant::player(color))?;
        for wall in walls.active(color) {
            board.set_edge(*wall, EdgeState::Wall(color))?;
        }
    }
    for wall in walls.locked() {
        board.set_edge(*wall, EdgeState::Locked)?;
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Slot;

    #[test]
    fn test_from_default_config() {
        let config = GameConfig::default().locked(vec![Coord::new(1, 2)]);
        let state = GameState::from_config(&config).unwrap();

        assert_eq!(*state.turn(), Color::Red);
        assert_eq!(*state.phase(), Phase::PlacingWalls);
        assert_eq!(state.dice_value(), 0);
        assert_eq!(
            state.current_board().edge(Coord::new(1, 2)),
            Some(EdgeState::Locked)
        );
        let start = state.current_board().occupants(Coord::cell(0, 2)).unwrap();
        assert!(start.contains(Occupant::RedPlayer));
        assert_eq!(state.current_board().compare_edges(state.old_board()), Ok(0));
    }

    #[test]
    fn test_begin_turn_snapshots_current_board() {
        let config = GameConfig::default();
        let mut state = GameState::from_config(&config).unwrap();
        state.walls_mut().active_mut(Color::Red).push(Coord::new(1, 2));
        state
            .current_board_mut()
            .set_edge(Coord::new(1, 2), EdgeState::Wall(Color::Red))
            .unwrap();
        assert_eq!(state.refresh_wall_edit_count(), Ok(1));

        state.begin_turn(Color::Blue).unwrap();
        assert_eq!(*state.wall_edit_count(), 0);
        assert_eq!(
            state.old_board().get(Coord::new(1, 2)),
            Some(Slot::Edge(EdgeState::Wall(Color::Red)))
        );
        assert_eq!(state.current_board().compare_edges(state.old_board()), Ok(0));
    }
}
