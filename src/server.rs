use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::engine::SessionProvider;
use crate::handlers::Route;
use crate::protocol::GatewayError;
use crate::worker::{self, WorkerHandle};

/// HTTP front end for one engine session.
pub struct GatewayServer {
    config: GatewayConfig,
    provider: Arc<dyn SessionProvider>,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig, provider: Arc<dyn SessionProvider>) -> Self {
        Self { config, provider }
    }

    /// Bind the listener and serve until the process exits.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.socket_addr_string();
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "Engine gateway listening");

        let worker = worker::spawn(self.provider);
        let router = build_router(worker, self.config.max_body_bytes);

        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Build the router for the four engine routes.
///
/// Every route accepts any method and forwards the raw body to `worker`.
/// Bodies over `max_body_bytes` are answered as decode failures.
pub fn build_router(worker: WorkerHandle, max_body_bytes: usize) -> Router {
    Route::ALL
        .into_iter()
        .fold(Router::<WorkerHandle>::new(), |router, route| {
            router.route(
                route.path(),
                any(
                    move |State(worker): State<WorkerHandle>,
                          body: Result<Bytes, BytesRejection>| {
                        handle_route(route, worker, body)
                    },
                ),
            )
        })
        .with_state(worker)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}

async fn handle_route(
    route: Route,
    worker: WorkerHandle,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = body.map_err(|rejection| {
        tracing::warn!(route = route.name(), error = %rejection, "Cannot read request body");
        GatewayError::Decode(rejection.body_text())
    });

    match worker.submit(route, body).await {
        Ok(json) => json.into_response(),
        Err(err) => err.into_response(),
    }
}
