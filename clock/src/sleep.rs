use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use timerlab_types::{SimInstant, TimerError, TimerId};
use tokio::sync::oneshot;

/// A delay registered with a [`SimulatedClock`](crate::SimulatedClock).
///
/// The timer exists from the moment `SimulatedClock::sleep` returns, whether or
/// not this future is ever polled. It completes once an advance operation
/// fires it, and fails with [`TimerError::Cleared`] if the timer is removed
/// first (including when the clock itself is dropped).
#[derive(Debug)]
#[must_use = "the timer is registered either way; dropping the Sleep discards its completion"]
pub struct Sleep {
    id: TimerId,
    deadline: SimInstant,
    fired: Arc<AtomicBool>,
    rx: oneshot::Receiver<()>,
}

impl Sleep {
    pub(crate) fn new(
        id: TimerId,
        deadline: SimInstant,
        fired: Arc<AtomicBool>,
        rx: oneshot::Receiver<()>,
    ) -> Self {
        Self {
            id,
            deadline,
            fired,
            rx,
        }
    }

    #[must_use]
    pub fn id(&self) -> TimerId {
        self.id
    }

    #[must_use]
    pub fn deadline(&self) -> SimInstant {
        self.deadline
    }

    /// Whether an advance operation has fired this timer.
    #[must_use]
    pub fn is_elapsed(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Future for Sleep {
    type Output = Result<(), TimerError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| TimerError::Cleared { id }))
    }
}

/// What happens when a simulated timer fires.
pub(crate) enum TimerAction {
    /// Complete a [`Sleep`].
    Wake {
        tx: oneshot::Sender<()>,
        fired: Arc<AtomicBool>,
    },
    /// Run a callback registered with `set_timeout`.
    Callback(Box<dyn FnOnce() + Send>),
}

impl TimerAction {
    pub(crate) fn run(self) {
        match self {
            TimerAction::Wake { tx, fired } => {
                fired.store(true, Ordering::Release);
                // The Sleep may have been dropped already; nothing is waiting then.
                let _ = tx.send(());
            }
            TimerAction::Callback(callback) => callback(),
        }
    }
}
