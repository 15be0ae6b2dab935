//! Estate Data - client-side data access for a real-estate back office
//!
//! Provides a TTL cache, debounce/throttle wrappers, virtual-scroll windowing
//! and a paged data controller over REST-backed or injected fetch sources.

pub mod api;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod limiter;
pub mod models;
pub mod params;
pub mod tasks;
pub mod window;

pub use cache::{shared_cache, SharedCache, TtlCache};
pub use config::{Config, ControllerOptions};
pub use controller::{PagedDataController, RecordId};
pub use error::{DataError, Result};
pub use params::QueryParams;
pub use tasks::spawn_cleanup_task;
pub use window::{compute_visible_range, VisibleRange};
