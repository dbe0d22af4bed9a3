use serde::{Deserialize, Serialize};

use crate::codec::{null_as_default, OpaqueValue};

// Missing or `null` fields decode to their defaults. Requests are also
// serialized back out as the `incomingArgs` echo.

/// Body of `/eval`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub command: String,
}

/// Body of `/feval`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FevalRequest {
    /// Number of return values requested from the engine.
    #[serde(deserialize_with = "null_as_default")]
    pub nlhs: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub func: String,
    #[serde(deserialize_with = "null_as_default")]
    pub args: Vec<OpaqueValue>,
}

/// Body of `/getVariable`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetVariableRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub var_name: String,
}

/// Body of `/putVariable`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PutVariableRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub var_name: String,
    pub var_data: OpaqueValue,
}
