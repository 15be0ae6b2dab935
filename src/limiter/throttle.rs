//! Throttle
//!
//! Runs an action at most once per fixed window; calls inside the window are dropped.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use super::{boxed_action, Action};

// == Throttle ==
/// Leading-edge throttle wrapper.
///
/// The first call runs immediately and opens a cooldown of `interval`. Calls
/// made during the cooldown are discarded, not queued.
pub struct Throttle<A> {
    action: Action<A>,
    interval: Duration,
    window_opened: Mutex<Option<Instant>>,
}

impl<A: Send + 'static> Throttle<A> {
    /// Wraps `action` so it runs at most once per `interval`.
    pub fn new<F, Fut>(interval: Duration, action: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            action: boxed_action(action),
            interval,
            window_opened: Mutex::new(None),
        }
    }

    // == Call ==
    /// Runs the action now unless a cooldown is open.
    ///
    /// Returns true when the action was started, false when the call was dropped.
    pub fn call(&self, args: A) -> bool {
        let now = Instant::now();
        {
            let mut opened = self
                .window_opened
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(start) = *opened {
                if now.saturating_duration_since(start) < self.interval {
                    trace!("throttle: call dropped inside cooldown");
                    return false;
                }
            }
            *opened = Some(now);
        }

        tokio::spawn((self.action)(args));
        true
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
