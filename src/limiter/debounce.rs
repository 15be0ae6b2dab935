//! Debounce
//!
//! Delays an action until calls have been quiet for a fixed period.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

use super::{boxed_action, Action};

// == Debouncer ==
/// Trailing-edge debounce wrapper.
///
/// Every `call` cancels the pending timer and restarts it, so a burst of calls
/// collapses into a single run carrying the arguments of the last call. Once
/// the timer fires the action is detached from the timer, so later calls never
/// cancel an action that has already started.
pub struct Debouncer<A> {
    action: Action<A>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debouncer<A> {
    /// Wraps `action` so it runs `delay` after the latest call.
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            action: boxed_action(action),
            delay,
            pending: Mutex::new(None),
        }
    }

    // == Call ==
    /// Schedules the action with `args`, replacing any pending call.
    pub fn call(&self, args: A) {
        let action = self.action.clone();
        let delay = self.delay;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action(args));
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(timer) {
            if !previous.is_finished() {
                trace!("debounce: superseding pending call");
            }
            previous.abort();
        }
    }

    // == Cancel ==
    /// Drops the pending call, if any. Returns true when one was cancelled.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.take() {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    /// True while a call is waiting for its delay to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            timer.abort();
        }
    }
}
