//! Rate Limiters Module
//!
//! Debounce (trailing edge) and throttle (leading edge) wrappers around async actions.
//!
//! Both wrappers are synchronous to call and never block: the action runs on a
//! spawned tokio task, so they must be used from within a tokio runtime. The
//! outcome of the action is never observed by the limiter.

mod debounce;
mod throttle;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub use debounce::Debouncer;
pub use throttle::Throttle;

/// Future produced by a rate-limited action.
pub type ActionFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Type-erased async action taking one argument set.
pub(crate) type Action<A> = Arc<dyn Fn(A) -> ActionFuture + Send + Sync + 'static>;

pub(crate) fn boxed_action<A, F, Fut>(action: F) -> Action<A>
where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |args| Box::pin(action(args)) as ActionFuture)
}
