//! Value codec: the boundary between JSON wire text and engine values.
//!
//! Everything the gateway exchanges with the engine is an [`OpaqueValue`].
//! This module is the only place that looks inside one; handlers and the
//! engine link pass them through untouched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::protocol::GatewayError;

/// A value exchanged with the engine: scalar, array, string, struct or
/// handle, carried as a JSON tree.
///
/// Integers and floats keep the distinction `serde_json` gives them; any
/// further collapsing is the engine's business.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueValue(Value);

impl OpaqueValue {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn null() -> Self {
        Self(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }
}

impl From<Value> for OpaqueValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Decode a request body into `T`.
///
/// Missing fields fall back to `T`'s defaults; malformed JSON, an empty
/// body, or a field of the wrong type is a decode error.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Encode a response envelope as compact JSON text.
pub fn encode<T: Serialize>(response: &T) -> Result<String, GatewayError> {
    serde_json::to_string(response).map_err(|e| GatewayError::Encode(e.to_string()))
}

/// Deserialize a field that may be absent or `null` as its default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
