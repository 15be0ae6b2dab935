//! Cache key derivation.

use crate::params::QueryParams;

/// Builds the cache key for a logical key and an optional parameter set.
///
/// Absent or empty parameters map to the bare `base` key. Otherwise the
/// parameters are appended as JSON. `QueryParams` keeps its keys sorted, so
/// equal parameter sets always produce the same key.
pub fn derive_key(base: &str, params: Option<&QueryParams>) -> String {
    match params {
        Some(params) if !params.is_empty() => format!("{}_{}", base, params.to_canonical_json()),
        _ => base.to_string(),
    }
}
