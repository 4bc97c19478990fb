//! One channel per event kind behind a shared clock.

use super::{
    DiceRollResolved, DiceRollStarted, Event, EventChannel, EventClock, GameEvent, GameWon,
    PlayerMoved, Stamped, StartGame, TurnSwitched, WallEditCountChanged, WallToggled,
    WallsLocked,
};
use tracing::{debug, instrument};

/// All event channels of one match.
///
/// Cheap to clone; clones publish into and read from the same logs, so a
/// poller can hold a clone without touching the engine.
#[derive(Debug, Clone)]
pub struct EventHub {
    clock: EventClock,
    pub(super) start_game: EventChannel<StartGame>,
    pub(super) dice_roll_started: EventChannel<DiceRollStarted>,
    pub(super) dice_roll_resolved: EventChannel<DiceRollResolved>,
    pub(super) wall_toggled: EventChannel<WallToggled>,
    pub(super) wall_edit_count_changed: EventChannel<WallEditCountChanged>,
    pub(super) walls_locked: EventChannel<WallsLocked>,
    pub(super) player_moved: EventChannel<PlayerMoved>,
    pub(super) turn_switched: EventChannel<TurnSwitched>,
    pub(super) game_won: EventChannel<GameWon>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    /// Creates empty channels sharing one clock.
    pub fn new() -> Self {
        let clock = EventClock::new();
        Self {
            start_game: EventChannel::new(clock.clone()),
            dice_roll_started: EventChannel::new(clock.clone()),
            dice_roll_resolved: EventChannel::new(clock.clone()),
            wall_toggled: EventChannel::new(clock.clone()),
            wall_edit_count_changed: EventChannel::new(clock.clone()),
            walls_locked: EventChannel::new(clock.clone()),
            player_moved: EventChannel::new(clock.clone()),
            turn_switched: EventChannel::new(clock.clone()),
            game_won: EventChannel::new(clock.clone()),
            clock,
        }
    }

    /// The typed channel for `E`.
    pub fn channel<E: Event>(&self) -> &EventChannel<E> {
        E::channel(self)
    }

    /// The shared timestamp source.
    pub fn clock(&self) -> &EventClock {
        &self.clock
    }

    /// Routes `event` to its channel.
    #[instrument(skip(self), fields(kind = %event.kind()))]
    pub fn publish(&self, event: GameEvent) -> Stamped<GameEvent> {
        let stamped = match event {
            GameEvent::StartGame(e) => self.start_game.publish(e).map(GameEvent::from),
            GameEvent::DiceRollStarted(e) => self.dice_roll_started.publish(e).map(GameEvent::from),
            GameEvent::DiceRollResolved(e) => {
                self.dice_roll_resolved.publish(e).map(GameEvent::from)
            }
            GameEvent::WallToggled(e) => self.wall_toggled.publish(e).map(GameEvent::from),
            GameEvent::WallEditCountChanged(e) => {
                self.wall_edit_count_changed.publish(e).map(GameEvent::from)
            }
            GameEvent::WallsLocked(e) => self.walls_locked.publish(e).map(GameEvent::from),
            GameEvent::PlayerMoved(e) => self.player_moved.publish(e).map(GameEvent::from),
            GameEvent::TurnSwitched(e) => self.turn_switched.publish(e).map(GameEvent::from),
            GameEvent::GameWon(e) => self.game_won.publish(e).map(GameEvent::from),
        };
        debug!(ts = stamped.ts, "Event recorded");
        stamped
    }

    /// Events of every kind with `ts > cursor`, merged in timestamp order.
    ///
    /// The result is a consistent cut: no event older than the newest one
    /// returned is published afterwards, so advancing a cursor to the last
    /// `ts` never skips an event.
    #[instrument(skip(self))]
    pub fn replay_since(&self, cursor: i64) -> Vec<Stamped<GameEvent>> {
        let order = self.clock.reading();
        let mut merged = Vec::new();
        extend(&mut merged, &self.start_game, cursor);
        extend(&mut merged, &self.dice_roll_started, cursor);
        extend(&mut merged, &self.dice_roll_resolved, cursor);
        extend(&mut merged, &self.wall_toggled, cursor);
        extend(&mut merged, &self.wall_edit_count_changed, cursor);
        extend(&mut merged, &self.walls_locked, cursor);
        extend(&mut merged, &self.player_moved, cursor);
        extend(&mut merged, &self.turn_switched, cursor);
        extend(&mut merged, &self.game_won, cursor);
        drop(order);
        merged.sort_by_key(|stamped| stamped.ts);
        merged
    }
}

fn extend<E: Event>(out: &mut Vec<Stamped<GameEvent>>, channel: &EventChannel<E>, cursor: i64) {
    out.extend(
        channel
            .replay_since(cursor)
            .into_iter()
            .map(|stamped| stamped.map(Into::into)),
    );
}
