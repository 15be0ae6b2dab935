//! Fetch sources and record identity.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::controller::QueryParams;
use crate::error::Result;

/// Future returned by a [`FetchSource`].
pub type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<Vec<T>>> + Send + 'static>>;

// == Fetch Source ==
/// Asynchronous provider of record collections.
///
/// Implemented for every `Fn(QueryParams) -> impl Future<Output = Result<Vec<T>>>`,
/// so closures can be injected directly.
pub trait FetchSource<T>: Send + Sync + 'static {
    fn fetch(&self, params: QueryParams) -> FetchFuture<T>;
}

impl<T, F, Fut> FetchSource<T> for F
where
    T: 'static,
    F: Fn(QueryParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    fn fetch(&self, params: QueryParams) -> FetchFuture<T> {
        Box::pin(self(params))
    }
}

// == Record Id ==
/// Identity of a record, numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Num(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Num(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Num(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

/// Accessor returning the identity of a record.
pub type Identity<T> = Arc<dyn Fn(&T) -> RecordId + Send + Sync + 'static>;
