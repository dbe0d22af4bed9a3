//! The single request worker.
//!
//! This task owns the session provider and handles every request, one at a
//! time, in the order the HTTP layer submitted them. No two engine
//! operations can overlap because there is only ever one of these loops.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::Instrument;

use crate::engine::{EngineError, SessionProvider};
use crate::handlers::{self, RequestBody, Route};
use crate::protocol::{GatewayError, JsonBody};

type Reply = Result<JsonBody, GatewayError>;

/// A request waiting for the worker.
struct Job {
    route: Route,
    body: RequestBody,
    reply: oneshot::Sender<Reply>,
}

/// Cheap, cloneable handle for submitting requests to the worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    tx: mpsc::UnboundedSender<Job>,
}

/// Start the worker loop on the current runtime.
pub fn spawn(provider: Arc<dyn SessionProvider>) -> WorkerHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_worker_loop(rx, provider));
    WorkerHandle { tx }
}

impl WorkerHandle {
    /// Queue a request and wait for its outcome.
    ///
    /// Dropping the returned future does not cancel the request; the worker
    /// still runs it to completion.
    pub async fn submit(&self, route: Route, body: RequestBody) -> Reply {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = Job {
            route,
            body,
            reply: reply_tx,
        };

        if self.tx.send(job).is_err() {
            return Err(worker_stopped());
        }
        reply_rx.await.unwrap_or_else(|_| Err(worker_stopped()))
    }
}

async fn run_worker_loop(mut rx: mpsc::UnboundedReceiver<Job>, provider: Arc<dyn SessionProvider>) {
    while let Some(Job { route, body, reply }) = rx.recv().await {
        let span = tracing::debug_span!("operation", route = route.name());
        let job_provider = Arc::clone(&provider);
        // Each job runs in its own task so a panic fails that request only.
        // Awaiting it here keeps the next job from starting early.
        let job = tokio::spawn(
            async move { handlers::dispatch(route, job_provider.as_ref(), body).await }
                .instrument(span),
        );
        let outcome = match job.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(route = route.name(), error = %e, "Request aborted");
                Err(GatewayError::Engine(EngineError::Unavailable(format!(
                    "{} request aborted: {e}",
                    route.name()
                ))))
            }
        };

        if reply.send(outcome).is_err() {
            tracing::debug!(route = route.name(), "Client left before the reply was ready");
        }
    }

    tracing::info!("Request worker shutting down (all handles dropped)");
}

fn worker_stopped() -> GatewayError {
    GatewayError::Engine(EngineError::Unavailable(
        "request worker has stopped".to_string(),
    ))
}
