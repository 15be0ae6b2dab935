//! API Module
//!
//! REST access to the back-office backend, exposed as fetch sources.
//!
//! # Endpoints used
//! - `GET /{resource}` - List records, with query parameters
//! - `GET /{resource}/search?query=` - Free-text search

pub mod client;
pub mod source;

pub use client::{ApiClient, Resource};
pub use source::ResourceSource;
