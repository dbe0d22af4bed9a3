use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::request::{EvalRequest, FevalRequest};
use crate::codec::OpaqueValue;
use crate::engine::EngineError;

/// Message returned for any body that does not decode.
pub const DECODE_FAILURE_MESSAGE: &str = "Request body cannot be properly deserialized";

/// Fallback text when the engine raises without a message.
const EMPTY_ENGINE_MESSAGE: &str = "Engine reported an error without a message";

// ---------------------------------------------------------------------------
// Success envelopes
// ---------------------------------------------------------------------------

/// Reply to `/eval`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalResponse {
    pub incoming_args: EvalRequest,
    pub stdout: String,
    pub stderr: String,
}

/// Reply to `/feval`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FevalResponse {
    pub incoming_args: FevalRequest,
    pub result: OpaqueValue,
    pub stdout: String,
    pub stderr: String,
}

/// Reply to `/getVariable` and `/putVariable`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableResponse {
    pub var_name: String,
    pub var_data: OpaqueValue,
}

pub type GetVariableResponse = VariableResponse;
pub type PutVariableResponse = VariableResponse;

/// An encoded success envelope, sent as `application/json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonBody(pub String);

impl IntoResponse for JsonBody {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            self.0,
        )
            .into_response()
    }
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// Everything that can go wrong between reading a body and writing a reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The body is not JSON of the expected shape. Carries the parser detail.
    #[error("undecodable request body: {0}")]
    Decode(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// The success envelope could not be serialized.
    #[error("cannot encode response: {0}")]
    Encode(String),
}

impl GatewayError {
    /// HTTP status for this failure: 400 for undecodable bodies, 503 otherwise.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Engine(_) | Self::Encode(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Plain-text body sent to the client.
    ///
    /// Decode failures use a fixed message; the parser detail stays in the
    /// logs. Engine messages are passed through as the engine wrote them.
    pub fn message(&self) -> String {
        match self {
            Self::Decode(_) => DECODE_FAILURE_MESSAGE.to_string(),
            Self::Engine(EngineError::Execution(msg)) if msg.trim().is_empty() => {
                EMPTY_ENGINE_MESSAGE.to_string()
            }
            Self::Engine(err) => err.to_string(),
            Self::Encode(_) => self.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message(),
        )
            .into_response()
    }
}
