pub mod eval;
pub mod feval;
pub mod get_variable;
pub mod put_variable;

use async_trait::async_trait;
use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::engine::{EngineError, EngineSession, SessionProvider};
use crate::protocol::{GatewayError, JsonBody};

/// A request body as read by the HTTP layer. Read failures arrive here as
/// decode errors so they go through the same acquire/release path.
pub type RequestBody = Result<Bytes, GatewayError>;

/// The four endpoints the gateway serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Eval,
    Feval,
    GetVariable,
    PutVariable,
}

impl Route {
    pub const ALL: [Route; 4] = [
        Route::Eval,
        Route::Feval,
        Route::GetVariable,
        Route::PutVariable,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Eval => "/eval",
            Self::Feval => "/feval",
            Self::GetVariable => "/getVariable",
            Self::PutVariable => "/putVariable",
        }
    }

    pub fn name(self) -> &'static str {
        &self.path()[1..]
    }
}

/// One engine operation: its wire types and how to run it on a session.
#[async_trait]
pub trait Operation: Send + Sync {
    type Request: DeserializeOwned + Send;
    type Response: Serialize + Send;

    async fn execute(
        &self,
        session: &mut dyn EngineSession,
        request: Self::Request,
    ) -> Result<Self::Response, EngineError>;
}

/// Run the operation behind `route` against the provider's session.
pub async fn dispatch(
    route: Route,
    provider: &dyn SessionProvider,
    body: RequestBody,
) -> Result<JsonBody, GatewayError> {
    match route {
        Route::Eval => run(&eval::Eval, provider, body).await,
        Route::Feval => run(&feval::Feval, provider, body).await,
        Route::GetVariable => run(&get_variable::GetVariable, provider, body).await,
        Route::PutVariable => run(&put_variable::PutVariable, provider, body).await,
    }
}

/// Acquire, decode, execute, encode; then release on every path.
///
/// The session is acquired before the body is decoded, so `release` sees
/// exactly one call per request whichever step fails. The release happens
/// when the guard drops, which also covers a session that panics.
pub async fn run<O: Operation>(
    op: &O,
    provider: &dyn SessionProvider,
    body: RequestBody,
) -> Result<JsonBody, GatewayError> {
    let mut guard = ReleaseOnDrop {
        provider,
        session: None,
    };
    let outcome = execute_in(op, provider, &mut guard.session, body).await;
    drop(guard);

    if let Err(err) = &outcome {
        tracing::warn!(status = err.status().as_u16(), error = %err, "Request failed");
    }
    outcome
}

async fn execute_in<O: Operation>(
    op: &O,
    provider: &dyn SessionProvider,
    slot: &mut Option<Box<dyn EngineSession>>,
    body: RequestBody,
) -> Result<JsonBody, GatewayError> {
    let session = slot.insert(provider.acquire().await?);
    let request: O::Request = codec::decode(&body?)?;
    let response = op.execute(&mut **session, request).await?;
    codec::encode(&response).map(JsonBody)
}

/// Hands the session slot back to its provider exactly once.
struct ReleaseOnDrop<'a> {
    provider: &'a dyn SessionProvider,
    session: Option<Box<dyn EngineSession>>,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.provider.release(self.session.take());
    }
}
