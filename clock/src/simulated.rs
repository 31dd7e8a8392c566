//! Virtual timer queue driven only by explicit advance operations.
//!
//! Registering a timer never blocks and never moves time. Time moves only while
//! one of the `advance_*` / `run_*` operations is being awaited, and every such
//! operation yields to the scheduler before each timer it fires so that work
//! woken by the previous timer can register follow-up timers.

use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use timerlab_types::{DEFAULT_LOOP_LIMIT, SimInstant, TimerError, TimerId};
use tokio::sync::oneshot;
use tokio::task;

use crate::sleep::{Sleep, TimerAction};

#[derive(Default)]
struct State {
    now: SimInstant,
    next_id: TimerId,
    /// Keyed by deadline, then registration order.
    timers: BTreeMap<(SimInstant, TimerId), TimerAction>,
}

/// A clock whose timers fire only when an advance operation is awaited.
///
/// Cloning is cheap and every clone shares the same timer queue, so one clone
/// can be handed to a detached task that advances time while another registers
/// timers.
#[derive(Clone)]
pub struct SimulatedClock {
    state: Arc<Mutex<State>>,
    loop_limit: usize,
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SimulatedClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SimulatedClock")
            .field("now", &state.now)
            .field("pending", &state.timers.len())
            .field("loop_limit", &self.loop_limit)
            .finish()
    }
}

impl SimulatedClock {
    #[must_use]
    pub fn new() -> Self {
        Self::with_loop_limit(DEFAULT_LOOP_LIMIT)
    }

    /// A clock whose `advance_all` gives up after firing `loop_limit` timers.
    #[must_use]
    pub fn with_loop_limit(loop_limit: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            loop_limit: loop_limit.max(1),
        }
    }

    #[must_use]
    pub fn loop_limit(&self) -> usize {
        self.loop_limit
    }

    // Never held across an await or while a timer action runs.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn now(&self) -> SimInstant {
        self.lock().now
    }

    /// Number of timers registered and not yet fired or cleared.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock().timers.len()
    }

    /// Deadline of the timer the next advance would fire.
    #[must_use]
    pub fn next_deadline(&self) -> Option<SimInstant> {
        self.lock().timers.keys().next().map(|(deadline, _)| *deadline)
    }

    fn register(&self, delay: Duration, action: TimerAction) -> (TimerId, SimInstant) {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id = id.next();
        let deadline = state.now + delay;
        state.timers.insert((deadline, id), action);
        tracing::debug!(timer = %id, %deadline, ?delay, "registered simulated timer");
        (id, deadline)
    }

    /// Register a timer and return a future that completes when it fires.
    ///
    /// Registration happens here, synchronously, not on first poll.
    pub fn sleep(&self, delay: Duration) -> Sleep {
        let (tx, rx) = oneshot::channel();
        let fired = Arc::new(AtomicBool::new(false));
        let (id, deadline) = self.register(
            delay,
            TimerAction::Wake {
                tx,
                fired: Arc::clone(&fired),
            },
        );
        Sleep::new(id, deadline, fired, rx)
    }

    /// Run `callback` when virtual time reaches `now + delay`.
    ///
    /// The callback runs inside the advance operation that fires it and may
    /// register further timers on this clock.
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + Send + 'static,
    {
        self.register(delay, TimerAction::Callback(Box::new(callback)))
            .0
    }

    /// Remove a pending timer. Returns false if it already fired or was cleared.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let removed = {
            let mut state = self.lock();
            let key = state.timers.keys().find(|(_, timer)| *timer == id).copied();
            key.and_then(|key| state.timers.remove(&key))
        };
        // Dropped outside the lock: a callback's captures may touch this clock.
        let cleared = removed.is_some();
        drop(removed);
        if cleared {
            tracing::debug!(timer = %id, "cleared simulated timer");
        }
        cleared
    }

    /// Remove every pending timer and return how many there were.
    pub fn clear_all(&self) -> usize {
        let timers = mem::take(&mut self.lock().timers);
        let count = timers.len();
        drop(timers);
        tracing::debug!(count, "cleared all simulated timers");
        count
    }

    /// Pop the earliest timer accepted by `accept`, move time to its deadline and run it.
    fn fire_next<F>(&self, accept: F) -> Option<TimerId>
    where
        F: Fn(SimInstant, TimerId) -> bool,
    {
        let (deadline, id, action) = {
            let mut state = self.lock();
            let key = state
                .timers
                .keys()
                .find(|(deadline, id)| accept(*deadline, *id))
                .copied()?;
            let action = state.timers.remove(&key)?;
            state.now = state.now.max(key.0);
            (key.0, key.1, action)
        };
        tracing::debug!(timer = %id, %deadline, "firing simulated timer");
        action.run();
        Some(id)
    }

    /// Run every pending timer, including timers registered by the ones that fire,
    /// until the queue is empty. Returns the number of timers fired.
    ///
    /// This is the advance operation. It only makes progress while awaited (or
    /// while the task it was spawned on is scheduled); a timer registered after
    /// it has returned stays pending.
    pub async fn advance_all(&self) -> Result<usize, TimerError> {
        let mut fired = 0;
        while fired < self.loop_limit {
            settle().await;
            if self.fire_next(|_, _| true).is_none() {
                tracing::debug!(fired, now = %self.now(), "advance_all drained the timer queue");
                return Ok(fired);
            }
            fired += 1;
        }

        settle().await;
        if self.pending_count() == 0 {
            return Ok(fired);
        }
        tracing::warn!(limit = self.loop_limit, "advance_all hit its loop limit");
        Err(TimerError::LoopLimitExceeded {
            limit: self.loop_limit,
        })
    }

    /// Move virtual time forward by `delta`, firing every timer due on the way.
    ///
    /// Time ends at exactly `now + delta` even if no timer was due.
    pub async fn advance_by(&self, delta: Duration) -> Result<usize, TimerError> {
        let target = self.now() + delta;
        let fired = self.advance_until(target).await?;
        {
            let mut state = self.lock();
            state.now = state.now.max(target);
        }
        Ok(fired)
    }

    /// Fire only the earliest pending timer. Returns 0 or 1.
    pub async fn advance_to_next(&self) -> usize {
        settle().await;
        usize::from(self.fire_next(|_, _| true).is_some())
    }

    /// Move time to the latest deadline pending when this is called.
    ///
    /// Timers registered meanwhile fire only if they fall due by that deadline.
    pub async fn run_only_pending(&self) -> Result<usize, TimerError> {
        let last = self.lock().timers.keys().map(|(deadline, _)| *deadline).max();
        match last {
            Some(target) => self.advance_until(target).await,
            None => Ok(0),
        }
    }

    async fn advance_until(&self, target: SimInstant) -> Result<usize, TimerError> {
        let mut fired = 0;
        loop {
            settle().await;
            if self.fire_next(|deadline, _| deadline <= target).is_none() {
                return Ok(fired);
            }
            fired += 1;
            if fired >= self.loop_limit && self.next_deadline().is_some_and(|d| d <= target) {
                return Err(TimerError::LoopLimitExceeded {
                    limit: self.loop_limit,
                });
            }
        }
    }
}

/// Give every task woken by the previous timer a chance to run.
async fn settle() {
    task::yield_now().await;
}
