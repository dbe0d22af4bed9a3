use jsonschema::validator_for;
use serde_json::Value;

use crate::handlers::Route;

/// Why a body failed validation against one of the envelope schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema does not compile: {0}")]
    Compile(String),
    /// `subject` names what was checked, e.g. `getVariable response`.
    #[error("{subject} does not match its schema: {detail}")]
    Mismatch { subject: String, detail: String },
}

/// Success envelope of `/eval` (draft 2020-12).
pub const EVAL_RESPONSE_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["incomingArgs", "stdout", "stderr"],
  "additionalProperties": false,
  "properties": {
    "incomingArgs": {
      "type": "object",
      "required": ["command"],
      "additionalProperties": false,
      "properties": { "command": { "type": "string" } }
    },
    "stdout": { "type": "string" },
    "stderr": { "type": "string" }
  }
}"#;

/// Success envelope of `/feval`.
pub const FEVAL_RESPONSE_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["incomingArgs", "result", "stdout", "stderr"],
  "additionalProperties": false,
  "properties": {
    "incomingArgs": {
      "type": "object",
      "required": ["nlhs", "func", "args"],
      "additionalProperties": false,
      "properties": {
        "nlhs": { "type": "integer" },
        "func": { "type": "string" },
        "args": { "type": "array" }
      }
    },
    "result": true,
    "stdout": { "type": "string" },
    "stderr": { "type": "string" }
  }
}"#;

/// Success envelope of `/getVariable` and `/putVariable`.
pub const VARIABLE_RESPONSE_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["varName", "varData"],
  "additionalProperties": false,
  "properties": {
    "varName": { "type": "string" },
    "varData": true
  }
}"#;

/// Schema of the success envelope returned by `route`.
pub fn response_schema(route: Route) -> &'static str {
    match route {
        Route::Eval => EVAL_RESPONSE_SCHEMA,
        Route::Feval => FEVAL_RESPONSE_SCHEMA,
        Route::GetVariable | Route::PutVariable => VARIABLE_RESPONSE_SCHEMA,
    }
}

/// Validate a JSON instance against a JSON Schema (draft 2020-12).
pub fn validate_json(schema_str: &str, instance_str: &str) -> Result<(), SchemaValidationError> {
    check(schema_str, instance_str, "instance")
}

/// Validate a success body produced for `route`.
pub fn validate_response(route: Route, body: &str) -> Result<(), SchemaValidationError> {
    check(response_schema(route), body, &format!("{} response", route.name()))
}

fn check(schema_str: &str, instance_str: &str, subject: &str) -> Result<(), SchemaValidationError> {
    let schema: Value = serde_json::from_str(schema_str)?;
    let instance: Value = serde_json::from_str(instance_str)?;

    let validator =
        validator_for(&schema).map_err(|e| SchemaValidationError::Compile(e.to_string()))?;

    validator
        .validate(&instance)
        .map_err(|e| SchemaValidationError::Mismatch {
            subject: subject.to_string(),
            detail: e.to_string(),
        })
}
