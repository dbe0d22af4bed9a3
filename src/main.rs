use std::sync::Arc;

use engine_gateway::config::GatewayConfig;
use engine_gateway::engine::RemoteSessionProvider;
use engine_gateway::server::GatewayServer;
use engine_gateway::telemetry;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("engine-gateway: configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = telemetry::init(&config.log_filter) {
        eprintln!("engine-gateway: {e}");
        std::process::exit(1);
    }

    let provider = RemoteSessionProvider::from_config(&config);
    tracing::info!(engine = provider.engine_addr(), "Using engine session");

    let server = GatewayServer::new(config, Arc::new(provider));
    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Gateway stopped");
        std::process::exit(1);
    }
}
