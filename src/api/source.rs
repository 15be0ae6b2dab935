//! REST-backed fetch source.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::api::{ApiClient, Resource};
use crate::controller::{FetchFuture, FetchSource, QueryParams};
use crate::error::{DataError, Result};

/// Lists one resource of the back-office API.
///
/// The response body must be a JSON array of records; anything else is
/// reported as [`DataError::Format`].
#[derive(Debug)]
pub struct ResourceSource<T> {
    pub(crate) client: ApiClient,
    pub(crate) resource: Resource,
    pub(crate) _record: PhantomData<fn() -> T>,
}

impl<T> ResourceSource<T> {
    pub fn resource(&self) -> Resource {
        self.resource
    }
}

impl<T> FetchSource<T> for ResourceSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn fetch(&self, params: QueryParams) -> FetchFuture<T> {
        let request = self.client.list_request(self.resource, params);
        let resource = self.resource;

        Box::pin(async move {
            let response = request.send().await?.error_for_status()?;
            let body: Value = response.json().await?;
            let records = decode_records(body)?;
            debug!(%resource, count = records.len(), "records received");
            Ok(records)
        })
    }
}

/// Decodes a JSON array into records.
fn decode_records<T: DeserializeOwned>(body: Value) -> Result<Vec<T>> {
    let Value::Array(items) = body else {
        return Err(DataError::Format(format!(
            "expected a JSON array, got {}",
            json_kind(&body)
        )));
    };

    items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| DataError::Format(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
