//! Model list payloads
//!
//! Parsing of the `/models` response into ordered [`ModelRecord`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;

/// A model identifier as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: String,
}

impl ModelRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Parse a response body into model records, keeping server order.
///
/// Accepts the OpenAI shape `{"data": [{"id": ...}, ...]}` as well as a
/// bare top-level array of model objects.
pub fn parse_models(body: &[u8]) -> Result<Vec<ModelRecord>, FetchError> {
    let value: Value = serde_json::from_slice(body).map_err(FetchError::parse)?;
    models_from_value(&value)
}

/// Extract model records from an already decoded response body.
pub fn models_from_value(value: &Value) -> Result<Vec<ModelRecord>, FetchError> {
    let entries = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(FetchError::parse("'data' field is not a list")),
            None => return Err(FetchError::parse("missing 'data' field")),
        },
        _ => return Err(FetchError::parse("expected a JSON object or array")),
    };

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| match entry.get("id").and_then(Value::as_str) {
            Some(id) => Ok(ModelRecord::new(id)),
            None => Err(FetchError::parse(format!("model entry {} has no string 'id'", idx))),
        })
        .collect()
}
