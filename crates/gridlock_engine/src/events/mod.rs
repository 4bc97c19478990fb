//! Domain events and the channels that carry them to observers.
//!
//! Each event kind has its own append-only [`EventChannel`]. Remote pollers
//! pull with [`EventChannel::replay_since`]; in-process observers push-
//! subscribe with [`EventChannel::subscribe`]. [`EventHub`] bundles one
//! channel per kind around a shared [`EventClock`].

mod channel;
mod hub;

pub use channel::{EventChannel, EventClock, Subscription};
pub use hub::EventHub;

use crate::{Color, Coord};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// An event together with the time it was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamped<E> {
    /// Microseconds since the UNIX epoch, unique and increasing per hub.
    pub ts: i64,
    /// The payload.
    pub event: E,
}

impl<E> Stamped<E> {
    /// Converts the payload, keeping the timestamp.
    pub fn map<F, T>(self, f: F) -> Stamped<T>
    where
        F: FnOnce(E) -> T,
    {
        Stamped {
            ts: self.ts,
            event: f(self.event),
        }
    }
}

/// A match was (re)initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct StartGame {
    /// Color that acts first.
    pub starting_color: Color,
}

/// A dice roll began; the value follows after the configured delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct DiceRollStarted {
    /// Rolling color.
    pub color: Color,
}

/// A dice roll resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct DiceRollResolved {
    /// Rolling color.
    pub color: Color,
    /// Face drawn.
    pub value: u8,
}

/// A wall was placed or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct WallToggled {
    /// Owner of the wall.
    pub color: Color,
    /// Edge coordinate.
    pub coord: Coord,
    /// `true` for a placement, `false` for a removal.
    pub placed: bool,
}

/// The number of edges changed this turn moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct WallEditCountChanged {
    /// Edges differing from the start of the turn.
    pub count: usize,
}

/// The acting color finished editing walls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct WallsLocked {
    /// Acting color.
    pub color: Color,
}

/// A pawn hopped one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct PlayerMoved {
    /// Moving color.
    pub color: Color,
    /// Cell left.
    pub from: Coord,
    /// Cell entered.
    pub to: Coord,
    /// Movements made this turn, including this one.
    pub movement_count: u32,
}

/// Play passed to the other color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct TurnSwitched {
    /// Color now acting.
    pub new_turn: Color,
}

/// A pawn reached its goal. Terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct GameWon {
    /// Winning color.
    pub winner: Color,
}

/// Discriminant of [`GameEvent`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[allow(missing_docs)]
pub enum EventKind {
    StartGame,
    DiceRollStarted,
    DiceRollResolved,
    WallToggled,
    WallEditCountChanged,
    WallsLocked,
    PlayerMoved,
    TurnSwitched,
    GameWon,
}

/// Any domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum GameEvent {
    StartGame(StartGame),
    DiceRollStarted(DiceRollStarted),
    DiceRollResolved(DiceRollResolved),
    WallToggled(WallToggled),
    WallEditCountChanged(WallEditCountChanged),
    WallsLocked(WallsLocked),
    PlayerMoved(PlayerMoved),
    TurnSwitched(TurnSwitched),
    GameWon(GameWon),
}

impl GameEvent {
    /// Which channel this event belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::StartGame(_) => EventKind::StartGame,
            GameEvent::DiceRollStarted(_) => EventKind::DiceRollStarted,
            GameEvent::DiceRollResolved(_) => EventKind::DiceRollResolved,
            GameEvent::WallToggled(_) => EventKind::WallToggled,
            GameEvent::WallEditCountChanged(_) => EventKind::WallEditCountChanged,
            GameEvent::WallsLocked(_) => EventKind::WallsLocked,
            GameEvent::PlayerMoved(_) => EventKind::PlayerMoved,
            GameEvent::TurnSwitched(_) => EventKind::TurnSwitched,
            GameEvent::GameWon(_) => EventKind::GameWon,
        }
    }
}

/// A payload type with a dedicated channel in [`EventHub`].
pub trait Event: Clone + Into<GameEvent> + Send + Sync + 'static {
    /// Channel discriminant.
    const KIND: EventKind;

    /// This type's channel within `hub`.
    fn channel(hub: &EventHub) -> &EventChannel<Self>;
}

macro_rules! impl_event {
    ($($ty:ident => $field:ident),+ $(,)?) => {
        $(
            impl Event for $ty {
                const KIND: EventKind = EventKind::$ty;

                fn channel(hub: &EventHub) -> &EventChannel<Self> {
                    &hub.$field
                }
            }
        )+
    };
}

impl_event! {
    StartGame => start_game,
    DiceRollStarted => dice_roll_started,
    DiceRollResolved => dice_roll_resolved,
    WallToggled => wall_toggled,
    WallEditCountChanged => wall_edit_count_changed,
    WallsLocked => walls_locked,
    PlayerMoved => player_moved,
    TurnSwitched => turn_switched,
    GameWon => game_won,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_event_serializes_with_kind_tag() {
        let event: GameEvent = WallToggled::new(Color::Red, Coord::new(1, 2), true).into();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "wall_toggled");
        assert_eq!(json["color"], "red");
        assert_eq!(json["coord"]["row"], 1);
        assert_eq!(json["placed"], true);
    }

    #[test]
    fn test_kind_matches_trait_constant() {
        let event: GameEvent = GameWon::new(Color::Blue).into();
        assert_eq!(event.kind(), <GameWon as Event>::KIND);
        assert_eq!(EventKind::WallEditCountChanged.to_string(), "wall_edit_count_changed");
    }
}
