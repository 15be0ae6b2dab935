//! Partial record updates.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::controller::RecordId;
use crate::error::{DataError, Result};

/// Partial update for the record identified by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchUpdate {
    pub id: RecordId,
    /// Top-level fields to overwrite, in the record's serialized form
    pub fields: Map<String, Value>,
}

impl BatchUpdate {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }
}

/// Overwrites the top-level `fields` of `record` and rebuilds it.
///
/// Fails if the record does not serialize to a JSON object or the patched
/// object no longer deserializes into `T`.
pub(crate) fn apply_fields<T>(record: &T, fields: &Map<String, Value>) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut value =
        serde_json::to_value(record).map_err(|e| DataError::InvalidPatch(e.to_string()))?;

    let Value::Object(object) = &mut value else {
        return Err(DataError::InvalidPatch(
            "record does not serialize to an object".to_string(),
        ));
    };
    for (field, new_value) in fields {
        object.insert(field.clone(), new_value.clone());
    }

    serde_json::from_value(value).map_err(|e| DataError::InvalidPatch(e.to_string()))
}
