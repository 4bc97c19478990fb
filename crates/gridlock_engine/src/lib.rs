//! Gridlock rules engine.
//!
//! Two colors race their pawns to goal cells across a grid of cells and
//! edges, placing walls to slow each other down. A dice roll each turn splits
//! a fixed budget between movements and wall edits.
//!
//! # Architecture
//!
//! - **Board**: typed grid storage for cells, edges and corners
//! - **Pathfinder**: stateless shortest-path search over the cell graph
//! - **Engine**: the turn-phase state machine and its invariants
//! - **Events**: per-kind replayable logs with push subscribers
//!
//! # Example
//!
//! ```
//! use gridlock_engine::{Color, Coord, Engine, GameConfig, MatchId};
//!
//! let config = GameConfig::default().dice(vec![3], vec![3]).delay_ms(0);
//! let mut engine = Engine::new(MatchId::new("demo"), config)?;
//!
//! engine.begin_dice_roll()?;
//! assert_eq!(engine.resolve_dice_roll()?, 3);
//!
//! engine.add_edge(Coord::new(1, 2))?;
//! engine.lock_walls()?;
//! engine.set_player_location(Coord::cell(1, 2))?;
//! engine.switch_turn()?;
//! assert_eq!(engine.turn(), Color::Blue);
//! # Ok::<(), gridlock_engine::GameError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod config;
mod dice;
mod engine;
mod error;
mod pathfinder;
mod state;
mod types;

// Public modules
pub mod events;
pub mod invariants;
pub mod rules;

// Crate-level exports - Grid
pub use board::{Board, EdgeState, Occupant, Occupants, Slot};
pub use types::{Color, Coord, Direction, Orientation, PerColor, Phase, SlotKind};

// Crate-level exports - Search
pub use pathfinder::{has_path, shortest_path, shortest_path_guided};

// Crate-level exports - Engine
pub use config::GameConfig;
pub use dice::{Dice, DiceRoll, DiceState, RollId};
pub use engine::{Engine, MatchId, Snapshot};
pub use error::{GameError, Result};
pub use state::{GameState, WallLocations, MAX_ACTIVE_WALLS, TURN_BUDGET};
