//! Single-kind event log with pull replay and push subscribers.

use super::Stamped;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tracing::{debug, instrument, trace};

/// Source of unique, strictly increasing timestamps.
///
/// Values are wall-clock microseconds since the UNIX epoch, bumped by one
/// whenever the clock has not advanced since the previous stamp.
///
/// Channels sharing a clock also share its ordering gate: a publish holds
/// the write side from stamp to append, and a cross-channel read holds the
/// read side, so a merged read never sees a later stamp without every
/// earlier one.
#[derive(Debug, Clone, Default)]
pub struct EventClock {
    last: Arc<AtomicI64>,
    gate: Arc<RwLock<()>>,
}

impl EventClock {
    /// Creates a clock that has issued no stamps.
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn publishing(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn reading(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues the next timestamp.
    pub fn stamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_micros();
        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let next = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

type Callback<E> = Arc<dyn Fn(&Stamped<E>) + Send + Sync>;

struct ChannelInner<E> {
    log: Vec<Stamped<E>>,
    subscribers: Vec<(u64, Callback<E>)>,
    next_id: u64,
}

/// Append-only log of one event kind.
///
/// Clones share the same log and subscriber list.
pub struct EventChannel<E> {
    clock: EventClock,
    inner: Arc<RwLock<ChannelInner<E>>>,
}

impl<E> Clone for EventChannel<E> {
    fn clone(&self) -> Self {
        Self {
            clock: self.clock.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = read(&self.inner);
        f.debug_struct("EventChannel")
            .field("events", &inner.log.len())
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<E: Clone> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new(EventClock::new())
    }
}

fn read<E>(lock: &RwLock<ChannelInner<E>>) -> RwLockReadGuard<'_, ChannelInner<E>> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<E>(lock: &RwLock<ChannelInner<E>>) -> RwLockWriteGuard<'_, ChannelInner<E>> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl<E: Clone> EventChannel<E> {
    /// Creates an empty channel stamping from `clock`.
    pub fn new(clock: EventClock) -> Self {
        Self {
            clock,
            inner: Arc::new(RwLock::new(ChannelInner {
                log: Vec::new(),
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Stamps `event`, appends it, then notifies subscribers in
    /// registration order.
    ///
    /// Callbacks run after the log lock is released and may read the channel.
    #[instrument(skip_all)]
    pub fn publish(&self, event: E) -> Stamped<E> {
        let (stamped, subscribers) = {
            let _order = self.clock.publishing();
            let mut inner = write(&self.inner);
            let stamped = Stamped {
                ts: self.clock.stamp(),
                event,
            };
            inner.log.push(stamped.clone());
            let subscribers: Vec<Callback<E>> = inner
                .subscribers
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect();
            (stamped, subscribers)
        };
        trace!(ts = stamped.ts, subscribers = subscribers.len(), "Event published");
        for callback in subscribers {
            callback(&stamped);
        }
        stamped
    }

    /// Events with `ts > cursor`, oldest first.
    pub fn replay_since(&self, cursor: i64) -> Vec<Stamped<E>> {
        let inner = read(&self.inner);
        let start = inner.log.partition_point(|stamped| stamped.ts <= cursor);
        inner.log[start..].to_vec()
    }

    /// Every event published so far.
    pub fn history(&self) -> Vec<Stamped<E>> {
        read(&self.inner).log.clone()
    }

    /// Timestamp of the newest event.
    pub fn latest_ts(&self) -> Option<i64> {
        read(&self.inner).log.last().map(|stamped| stamped.ts)
    }

    /// Number of events published.
    pub fn len(&self) -> usize {
        read(&self.inner).log.len()
    }

    /// True when nothing has been published.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers `callback` for future events after replaying the existing
    /// history to it.
    #[instrument(skip_all)]
    pub fn subscribe<F>(&self, callback: F) -> Subscription<E>
    where
        F: Fn(&Stamped<E>) + Send + Sync + 'static,
    {
        let callback: Callback<E> = Arc::new(callback);
        let (id, history) = {
            let mut inner = write(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Arc::clone(&callback)));
            (id, inner.log.clone())
        };
        debug!(id, replayed = history.len(), "Subscriber added");
        for stamped in &history {
            callback(stamped);
        }
        Subscription {
            channel: Arc::downgrade(&self.inner),
            id,
        }
    }
}

/// Handle returned by [`EventChannel::subscribe`].
///
/// Dropping it keeps the subscription alive; call
/// [`Subscription::unsubscribe`] to stop delivery.
pub struct Subscription<E> {
    channel: Weak<RwLock<ChannelInner<E>>>,
    id: u64,
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl<E> Subscription<E> {
    /// Stops delivery. Returns `false` if the channel is gone or the
    /// subscriber was already removed.
    #[instrument(skip(self), fields(id = self.id))]
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.channel.upgrade() else {
            return false;
        };
        let mut inner = write(&inner);
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(id, _)| *id != self.id);
        let removed = inner.subscribers.len() < before;
        debug!(removed, "Subscriber removed");
        removed
    }
}
