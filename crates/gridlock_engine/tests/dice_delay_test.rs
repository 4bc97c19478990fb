//! The dice delay is the engine's only suspension point.

use gridlock_engine::events::{DiceRollResolved, DiceRollStarted};
use gridlock_engine::{Coord, DiceState, Engine, GameConfig, GameError, MatchId};
use std::time::Duration;
use tokio::time::Instant;

fn engine(delay_ms: u64) -> Engine {
    let config = GameConfig::default()
        .dice(vec![4], vec![2])
        .delay_ms(delay_ms);
    Engine::new(MatchId::new("dice"), config).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_roll_waits_for_configured_delay() {
    let mut engine = engine(1000);
    let started = Instant::now();

    let value = engine.roll_dice().await.unwrap();

    assert_eq!(value, 4);
    assert!(started.elapsed() >= Duration::from_millis(1000));
    let began = engine.events().channel::<DiceRollStarted>().history();
    let resolved = engine.events().channel::<DiceRollResolved>().history();
    assert_eq!(began.len(), 1);
    assert_eq!(resolved.len(), 1);
    assert!(began[0].ts < resolved[0].ts);
}

#[tokio::test(start_paused = true)]
async fn test_actions_rejected_until_value_resolves() {
    let mut engine = engine(1000);

    // Abandon the roll halfway through its delay.
    let outcome = tokio::time::timeout(Duration::from_millis(500), engine.roll_dice()).await;
    assert!(outcome.is_err());
    assert_eq!(engine.dice_state(), DiceState::Rolling);

    assert_eq!(
        engine.add_edge(Coord::new(1, 2)),
        Err(GameError::DiceNotRolled)
    );
    assert_eq!(engine.lock_walls(), Err(GameError::DiceNotRolled));

    assert_eq!(engine.resolve_dice_roll(), Ok(4));
    assert_eq!(engine.add_edge(Coord::new(1, 2)), Ok(1));
}

#[tokio::test(start_paused = true)]
async fn test_second_roll_returns_without_waiting() {
    let mut engine = engine(1000);
    let first = engine.roll_dice().await.unwrap();

    let started = Instant::now();
    let second = engine.roll_dice().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(engine.events().channel::<DiceRollStarted>().len(), 1);
}
