//! Match registry for the HTTP server.

use gridlock_engine::events::EventHub;
use gridlock_engine::{DiceRoll, Engine, GameConfig, GameError, MatchId, Snapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// One live match: the engine behind a mutex plus its event hub.
///
/// The hub clone lets pollers read events without taking the engine lock.
#[derive(Debug, Clone)]
pub struct MatchHandle {
    id: MatchId,
    engine: Arc<Mutex<Engine>>,
    events: EventHub,
}

impl MatchHandle {
    fn new(engine: Engine) -> Self {
        Self {
            id: engine.id().clone(),
            events: engine.events().clone(),
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Engine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Match identifier.
    pub fn id(&self) -> &MatchId {
        &self.id
    }

    /// Event channels of this match.
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Current view of the match.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    /// Runs one engine operation and returns the resulting snapshot, both
    /// under the same lock.
    pub fn apply<T>(
        &self,
        operation: impl FnOnce(&mut Engine) -> gridlock_engine::Result<T>,
    ) -> Result<(T, Snapshot), GameError> {
        let mut engine = self.lock();
        let output = operation(&mut engine)?;
        Ok((output, engine.snapshot()))
    }

    /// Rolls the acting color's die. The engine lock is released while the
    /// dice delay elapses; if the match restarts meanwhile, this roll is
    /// stale and fails instead of ending a newer one.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub async fn roll_dice(&self) -> Result<u8, GameError> {
        let (roll, delay) = {
            let mut engine = self.lock();
            let roll = engine.begin_dice_roll()?;
            (roll, engine.config().dice_delay())
        };
        match roll {
            DiceRoll::Resolved(value) => Ok(value),
            DiceRoll::Pending(roll) => {
                debug!(?delay, %roll, "Waiting for dice");
                tokio::time::sleep(delay).await;
                self.lock().resolve_started_roll(roll)
            }
        }
    }
}

/// Manages all live matches.
#[derive(Debug, Clone)]
pub struct MatchRegistry {
    matches: Arc<Mutex<HashMap<MatchId, MatchHandle>>>,
    default_config: GameConfig,
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl MatchRegistry {
    /// Creates an empty registry whose matches default to `default_config`.
    #[instrument(skip(default_config))]
    pub fn new(default_config: GameConfig) -> Self {
        info!("Creating match registry");
        Self {
            matches: Arc::new(Mutex::new(HashMap::new())),
            default_config,
        }
    }

    fn matches(&self) -> MutexGuard<'_, HashMap<MatchId, MatchHandle>> {
        self.matches.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Config used when `create` is given none.
    pub fn default_config(&self) -> &GameConfig {
        &self.default_config
    }

    /// Starts a match under a fresh random id.
    #[instrument(skip(self, config))]
    pub fn create(&self, config: Option<GameConfig>) -> Result<MatchHandle, GameError> {
        let config = config.unwrap_or_else(|| self.default_config.clone());
        let mut matches = self.matches();
        let id = loop {
            let candidate = MatchId::random();
            if !matches.contains_key(&candidate) {
                break candidate;
            }
        };
        let handle = MatchHandle::new(Engine::new(id.clone(), config)?);
        matches.insert(id.clone(), handle.clone());
        info!(match_id = %id, total = matches.len(), "Match created");
        Ok(handle)
    }

    /// Looks up a match.
    pub fn get(&self, id: &MatchId) -> Option<MatchHandle> {
        let handle = self.matches().get(id).cloned();
        if handle.is_none() {
            debug!(match_id = %id, "Match not found");
        }
        handle
    }

    /// Ids of all live matches, sorted.
    pub fn list(&self) -> Vec<MatchId> {
        let mut ids: Vec<MatchId> = self.matches().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drops a match. Returns `false` if it did not exist.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &MatchId) -> bool {
        let removed = self.matches().remove(id).is_some();
        if removed {
            info!(match_id = %id, "Match removed");
        } else {
            warn!(match_id = %id, "Remove requested for unknown match");
        }
        removed
    }

    /// Number of live matches.
    pub fn len(&self) -> usize {
        self.matches().len()
    }

    /// True when no match is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
