//! Access to the computation engine session.
//!
//! The gateway never talks to an engine directly: it asks a
//! [`SessionProvider`] for an [`EngineSession`], runs one operation, and
//! hands the session back. [`remote`] is the TCP implementation the binary
//! uses; tests substitute their own.

pub mod remote;
mod rpc;

use async_trait::async_trait;

use crate::codec::OpaqueValue;

pub use remote::RemoteSessionProvider;

/// Failures originating at or below the session boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// No engine could be reached at acquire time, or the link dropped.
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    /// The engine ran the operation and raised.
    #[error("{0}")]
    Execution(String),
}

/// Standard output and error text written by the engine during one
/// operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// An exclusive handle to the running engine.
///
/// Implementations may assume they are never driven concurrently; the
/// request worker runs one operation at a time.
#[async_trait]
pub trait EngineSession: Send {
    /// Run `command` as a top-level statement.
    async fn eval(&mut self, command: &str, output: &mut CapturedOutput)
        -> Result<(), EngineError>;

    /// Call `func` with `args`, asking for `nlhs` return values.
    ///
    /// The result is whatever single value the engine uses to represent
    /// zero, one, or several returns.
    async fn feval(
        &mut self,
        nlhs: i32,
        func: &str,
        args: &[OpaqueValue],
        output: &mut CapturedOutput,
    ) -> Result<OpaqueValue, EngineError>;

    /// Read a workspace variable. Unbound names are an `Execution` error.
    async fn get_variable(&mut self, name: &str) -> Result<OpaqueValue, EngineError>;

    /// Bind `value` to `name`, replacing any existing binding.
    async fn put_variable(&mut self, name: &str, value: &OpaqueValue) -> Result<(), EngineError>;

    /// Close this handle. The engine itself keeps running.
    async fn disconnect(self: Box<Self>);
}

/// Resolves the process-wide engine session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Obtain a handle to the already-running engine.
    async fn acquire(&self) -> Result<Box<dyn EngineSession>, EngineError>;

    /// Give a handle back without waiting on it.
    ///
    /// Called once per request, with `None` when `acquire` failed.
    fn release(&self, session: Option<Box<dyn EngineSession>>) {
        if let Some(session) = session {
            disconnect_detached(session);
        }
    }
}

/// Disconnect `session` on a background task.
pub fn disconnect_detached(session: Box<dyn EngineSession>) {
    tokio::spawn(session.disconnect());
}
