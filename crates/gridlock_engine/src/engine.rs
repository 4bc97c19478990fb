//! The turn-phase state machine for one match.
//!
//! Every mutating operation validates first and mutates only after all of its
//! preconditions pass, so a rejected call leaves the state untouched. Accepted
//! mutations publish their domain events into the match's [`EventHub`].

use crate::events::{
    DiceRollResolved, DiceRollStarted, EventHub, GameEvent, GameWon, PlayerMoved, StartGame,
    TurnSwitched, WallEditCountChanged, WallToggled, WallsLocked,
};
use crate::invariants::{InvariantSet, LockedInInvariants, WallInvariants};
use crate::rules::{
    LegalLock, LegalMove, LegalSwitch, LegalWallPlacement, LegalWallRemoval, NotGameOver,
};
use crate::{
    shortest_path, Board, Color, Coord, Dice, DiceRoll, DiceState, Direction, EdgeState,
    GameConfig, GameError, GameState, Occupant, PerColor, Phase, Result, RollId, WallLocations,
};
use derive_getters::Getters;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Identifier of one match.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Wraps a caller-supplied identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Sixteen random hex digits.
    pub fn random() -> Self {
        Self(format!("{:016x}", rand::thread_rng().next_u64()))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Serializable view of a match for observers.
#[derive(Debug, Clone, Serialize, Getters)]
pub struct Snapshot {
    /// Match identifier.
    id: MatchId,
    /// Color acting now.
    turn: Color,
    /// Current phase.
    phase: Phase,
    /// Terminal flag.
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
    /// Hops made this turn.
    movement_count: u32,
    /// Edges changed this turn.
    wall_edit_count: usize,
    /// Cells the acting pawn can hop to.
    legal_moves: Vec<Coord>,
    /// Whether each color can reach its goal.
    path_exists: PerColor<bool>,
    /// Whether `switch_turn` would succeed now.
    can_end_turn: bool,
    /// Die faces per color.
    dice_faces: PerColor<Vec<u8>>,
    /// Text rendering of the live board.
    board: String,
}

/// Authoritative rules engine for exactly one match.
///
/// The engine does no locking; callers serialize mutating calls.
#[derive(Debug)]
pub struct Engine {
    id: MatchId,
    config: GameConfig,
    state: GameState,
    dice: Dice,
    events: EventHub,
    rolls_started: u64,
    current_roll: Option<RollTicket>,
}

/// The roll this turn's dice state belongs to, and the color it rolls for.
#[derive(Debug, Clone, Copy)]
struct RollTicket {
    id: RollId,
    color: Color,
}

fn rejected(operation: &'static str) -> impl FnOnce(&GameError) {
    move |error: &GameError| {
        warn!(operation, code = error.code(), error = %error, "Operation rejected");
    }
}

impl Engine {
    /// Creates and starts a match.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `config` fails validation.
    #[instrument(skip_all, fields(match_id = %id))]
    pub fn new(id: MatchId, config: GameConfig) -> Result<Self> {
        config.validate().inspect_err(rejected("new"))?;
        let state = GameState::from_config(&config)?;
        let dice = Dice::new(config.dice_faces().clone(), *config.seed());
        let engine = Self {
            id,
            config,
            state,
            dice,
            events: EventHub::new(),
            rolls_started: 0,
            current_roll: None,
        };
        engine.announce_start();
        Ok(engine)
    }

    fn announce_start(&self) {
        let starting_color = *self.state.turn();
        self.publish(StartGame::new(starting_color));
        info!(
            %starting_color,
            width = *self.state.width(),
            height = *self.state.height(),
            "Match started"
        );
    }

    fn publish(&self, event: impl Into<GameEvent>) {
        self.events.publish(event.into());
    }

    // ─────────────────────────────────────────────────────────────
    //  Mutations
    // ─────────────────────────────────────────────────────────────

    /// Rebuilds every piece of state from the config and clears `game_over`.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn start_game(&mut self) -> Result<()> {
        self.state = GameState::from_config(&self.config)?;
        self.dice = Dice::new(self.config.dice_faces().clone(), *self.config.seed());
        self.current_roll = None;
        self.announce_start();
        Ok(())
    }

    /// Starts this turn's roll.
    ///
    /// The first call emits `DiceRollStarted` and returns
    /// [`DiceRoll::Pending`] with a fresh [`RollId`]. Later calls emit
    /// nothing: they return the same `Pending` id while the roll is in flight
    /// and the resolved value after.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn begin_dice_roll(&mut self) -> Result<DiceRoll> {
        NotGameOver::check(&self.state).inspect_err(rejected("roll_dice"))?;
        let color = *self.state.turn();
        match *self.state.dice() {
            DiceState::Rolled(value) => {
                warn!(%color, value, "Dice already rolled this turn");
                Ok(DiceRoll::Resolved(value))
            }
            DiceState::Rolling => {
                let ticket = self.in_flight()?;
                warn!(color = %ticket.color, roll = %ticket.id, "Dice roll already in flight");
                Ok(DiceRoll::Pending(ticket.id))
            }
            DiceState::NotRolled => {
                self.rolls_started += 1;
                let id = RollId(self.rolls_started);
                self.current_roll = Some(RollTicket { id, color });
                self.state.set_dice(DiceState::Rolling);
                self.publish(DiceRollStarted::new(color));
                info!(%color, roll = %id, "Dice roll started");
                Ok(DiceRoll::Pending(id))
            }
        }
    }

    /// Draws the value of whichever roll is in flight.
    ///
    /// Returns the existing value if the roll already resolved. Callers that
    /// wait between starting and resolving should use
    /// [`Engine::resolve_started_roll`] so a superseded roll cannot end a
    /// newer one.
    ///
    /// # Errors
    ///
    /// `GameOver`, or `DiceNotRolled` if no roll was started this turn.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn resolve_dice_roll(&mut self) -> Result<u8> {
        NotGameOver::check(&self.state).inspect_err(rejected("roll_dice"))?;
        match self.current_roll {
            Some(ticket) => self.resolve_started_roll(ticket.id),
            None => Err(GameError::DiceNotRolled).inspect_err(rejected("roll_dice")),
        }
    }

    /// Draws the value of roll `id`, as returned by
    /// [`Engine::begin_dice_roll`].
    ///
    /// The value comes from the die of the color that started the roll.
    /// Resolving an already resolved `id` returns its value again.
    ///
    /// # Errors
    ///
    /// `GameOver`, or `StaleDiceRoll` if `id` is not this turn's roll, for
    /// example after [`Engine::start_game`] or a turn switch.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn resolve_started_roll(&mut self, id: RollId) -> Result<u8> {
        NotGameOver::check(&self.state).inspect_err(rejected("roll_dice"))?;
        let ticket = match self.current_roll {
            Some(ticket) if ticket.id == id => ticket,
            _ => return Err(GameError::StaleDiceRoll(id)).inspect_err(rejected("roll_dice")),
        };
        match *self.state.dice() {
            DiceState::Rolled(value) => Ok(value),
            DiceState::NotRolled => {
                Err(GameError::DiceNotRolled).inspect_err(rejected("roll_dice"))
            }
            DiceState::Rolling => {
                let color = ticket.color;
                let value = self
                    .dice
                    .roll(color)
                    .ok_or_else(|| GameError::InvalidConfig(format!("{color} die has no faces")))?;
                self.state.set_dice(DiceState::Rolled(value));
                self.publish(DiceRollResolved::new(color, value));
                info!(%color, roll = %id, value, "Dice roll resolved");
                Ok(value)
            }
        }
    }

    fn in_flight(&self) -> Result<RollTicket> {
        self.current_roll.ok_or(GameError::DiceNotRolled)
    }

    /// Rolls the acting color's die, waiting the configured delay between
    /// `DiceRollStarted` and `DiceRollResolved`.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub async fn roll_dice(&mut self) -> Result<u8> {
        match self.begin_dice_roll()? {
            DiceRoll::Resolved(value) => Ok(value),
            DiceRoll::Pending(id) => {
                tokio::time::sleep(self.config.dice_delay()).await;
                self.resolve_started_roll(id)
            }
        }
    }

    /// Places the acting color's wall on `coord`. Returns the turn's new
    /// wall-edit count.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn add_edge(&mut self, coord: Coord) -> Result<usize> {
        LegalWallPlacement::check(&self.state, coord).inspect_err(rejected("add_edge"))?;
        let color = *self.state.turn();

        self.state
            .current_board_mut()
            .set_edge(coord, EdgeState::Wall(color))?;
        self.state.walls_mut().active_mut(color).push(coord);
        let count = self.state.refresh_wall_edit_count()?;

        self.publish(WallToggled::new(color, coord, true));
        self.publish(WallEditCountChanged::new(count));
        debug_assert!(WallInvariants::check_all(&self.state).is_ok());

        info!(
            %color,
            %coord,
            active = self.state.walls().active(color).len(),
            edits = count,
            "Wall placed"
        );
        Ok(count)
    }

    /// Removes the acting color's wall from `coord`. Returns the turn's new
    /// wall-edit count.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn remove_edge(&mut self, coord: Coord) -> Result<usize> {
        LegalWallRemoval::check(&self.state, coord).inspect_err(rejected("remove_edge"))?;
        let color = *self.state.turn();

        self.state
            .current_board_mut()
            .set_edge(coord, EdgeState::Empty)?;
        self.state
            .walls_mut()
            .active_mut(color)
            .retain(|wall| *wall != coord);
        let count = self.state.refresh_wall_edit_count()?;

        self.publish(WallToggled::new(color, coord, false));
        self.publish(WallEditCountChanged::new(count));
        debug_assert!(WallInvariants::check_all(&self.state).is_ok());

        info!(
            %color,
            %coord,
            active = self.state.walls().active(color).len(),
            edits = count,
            "Wall removed"
        );
        Ok(count)
    }

    /// Ends wall editing for this turn and enters [`Phase::MovingPlayer`].
    ///
    /// Requires both colors to be connected. The turn budget is not checked
    /// until [`Engine::switch_turn`].
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn lock_walls(&mut self) -> Result<()> {
        LegalLock::check(&self.state).inspect_err(rejected("lock_walls"))?;
        let color = *self.state.turn();

        self.state.set_phase(Phase::MovingPlayer);
        self.publish(WallsLocked::new(color));
        debug_assert!(LockedInInvariants::check_all(&self.state).is_ok());

        info!(%color, edits = *self.state.wall_edit_count(), "Walls locked");
        Ok(())
    }

    /// Hops the acting pawn to `to`. Reaching the goal ends the match.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn set_player_location(&mut self, to: Coord) -> Result<()> {
        LegalMove::check(&self.state, to).inspect_err(rejected("set_player_location"))?;
        let color = *self.state.turn();
        let from = self.state.player_location(color);

        let board = self.state.current_board_mut();
        board.remove_occupant(from, Occupant::player(color))?;
        board.add_occupant(to, Occupant::player(color))?;
        self.state.move_player(color, to);

        let movement_count = *self.state.movement_count();
        self.publish(PlayerMoved::new(color, from, to, movement_count));
        info!(%color, %from, %to, movement_count, "Player moved");

        if to == self.state.goal_location(color) {
            self.state.set_game_over();
            self.publish(GameWon::new(color));
            info!(winner = %color, "Game won");
        }
        Ok(())
    }

    /// Passes play to the other color.
    ///
    /// Requires both colors to be connected and the turn's movements and
    /// wall edits to fit the dice value.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn switch_turn(&mut self) -> Result<()> {
        LegalSwitch::check(&self.state).inspect_err(rejected("switch_turn"))?;
        let next = self.state.turn().opponent();

        self.state.begin_turn(next)?;
        self.current_roll = None;
        self.publish(TurnSwitched::new(next));
        self.publish(WallEditCountChanged::new(0));
        debug_assert!(LockedInInvariants::check_all(&self.state).is_ok());

        info!(new_turn = %next, "Turn switched");
        Ok(())
    }

    /// Resets only the turn to the starting color and the phase to
    /// [`Phase::PlacingWalls`]. Counters, dice and boards are untouched; use
    /// [`Engine::start_game`] for a full reset.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn reset(&mut self) -> Result<()> {
        NotGameOver::check(&self.state).inspect_err(rejected("reset"))?;
        let starting_color = *self.config.starting_color();
        self.state.set_turn(starting_color);
        self.state.set_phase(Phase::PlacingWalls);
        info!(%starting_color, "Turn and phase reset");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    //  Queries
    // ─────────────────────────────────────────────────────────────

    /// Match identifier.
    pub fn id(&self) -> &MatchId {
        &self.id
    }

    /// Config the match was built from.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Full state, read-only.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Event channels of this match.
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Color acting now.
    pub fn turn(&self) -> Color {
        *self.state.turn()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        *self.state.phase()
    }

    /// True once a pawn has reached its goal.
    pub fn is_game_over(&self) -> bool {
        *self.state.game_over()
    }

    /// This turn's roll progress.
    pub fn dice_state(&self) -> DiceState {
        *self.state.dice()
    }

    /// Resolved dice value, or 0 before a roll.
    pub fn dice_value(&self) -> u8 {
        self.state.dice_value()
    }

    /// True once this turn's value has resolved.
    pub fn dice_rolled(&self) -> bool {
        self.state.dice().value().is_some()
    }

    /// Pawn location of `color`.
    pub fn player_location(&self, color: Color) -> Coord {
        self.state.player_location(color)
    }

    /// Goal location of `color`.
    pub fn goal_location(&self, color: Color) -> Coord {
        self.state.goal_location(color)
    }

    /// Active and locked walls.
    pub fn wall_locations(&self) -> &WallLocations {
        self.state.walls()
    }

    /// Face multiset of `color`'s die.
    pub fn dice_faces(&self, color: Color) -> &[u8] {
        self.dice.faces(color)
    }

    /// Width in cells.
    pub fn width(&self) -> u16 {
        *self.state.width()
    }

    /// Height in cells.
    pub fn height(&self) -> u16 {
        *self.state.height()
    }

    /// Live board.
    pub fn current_board(&self) -> &Board {
        self.state.current_board()
    }

    /// Board as it was when the turn began.
    pub fn old_board(&self) -> &Board {
        self.state.old_board()
    }

    /// Hops made this turn.
    pub fn movement_count(&self) -> u32 {
        *self.state.movement_count()
    }

    /// Edges changed this turn.
    pub fn wall_edit_count(&self) -> usize {
        *self.state.wall_edit_count()
    }

    /// Shortest path from `color`'s pawn to its goal on the live board.
    pub fn shortest_path(&self, color: Color) -> Option<Vec<Coord>> {
        shortest_path(
            self.state.current_board(),
            self.state.player_location(color),
            self.state.goal_location(color),
        )
    }

    /// True if `color` can still reach its goal.
    pub fn path_exists(&self, color: Color) -> bool {
        self.shortest_path(color).is_some()
    }

    /// True if [`Engine::switch_turn`] would succeed now.
    pub fn can_end_turn(&self) -> bool {
        LegalSwitch::check(&self.state).is_ok()
    }

    /// Cells the acting pawn can hop to from where it stands, ignoring phase
    /// and dice.
    pub fn legal_moves(&self) -> Vec<Coord> {
        let from = self.state.player_location(*self.state.turn());
        let board = self.state.current_board();
        Direction::ALL
            .into_iter()
            .filter_map(|direction| from.hop(direction))
            .filter(|to| board.can_hop(from, *to))
            .collect()
    }

    /// Serializable view of the match.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            id: self.id.clone(),
            turn: self.turn(),
            phase: self.phase(),
            game_over: self.is_game_over(),
            dice: self.dice_state(),
            width: self.width(),
            height: self.height(),
            players: self.state.players().clone(),
            goals: self.state.goals().clone(),
            walls: self.state.walls().clone(),
            movement_count: self.movement_count(),
            wall_edit_count: self.wall_edit_count(),
            legal_moves: self.legal_moves(),
            path_exists: PerColor::new(self.path_exists(Color::Red), self.path_exists(Color::Blue)),
            can_end_turn: self.can_end_turn(),
            dice_faces: self.state.dice_faces().clone(),
            board: self.state.current_board().to_string(),
        }
    }
}
