//! Controller Module
//!
//! The paged data controller and the types it exchanges with fetch sources and views.

mod paged;
mod patch;
mod source;
mod state;

#[cfg(test)]
mod tests;

pub use paged::PagedDataController;
pub use crate::params::QueryParams;
pub use patch::BatchUpdate;
pub use source::{FetchFuture, FetchSource, Identity, RecordId};
pub use state::{DataState, LoadPhase};
