use std::time::Duration;

/// Default listen port.
const DEFAULT_PORT: u16 = 8080;

/// Default bound on connecting to the engine (5 seconds).
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default limit for request bodies and engine reply lines (1 MiB).
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Gateway configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub port: u16,
    pub engine_addr: String,
    pub connect_timeout: Duration,
    pub max_body_bytes: usize,
    pub log_filter: String,
}

impl GatewayConfig {
    /// Load configuration from environment.
    ///
    /// - `ENGINE_GATEWAY_ENGINE_ADDR` (required) — `host:port` of the running engine
    /// - `ENGINE_GATEWAY_BIND_ADDR` (optional, default `0.0.0.0`)
    /// - `ENGINE_GATEWAY_PORT` (optional, default 8080)
    /// - `ENGINE_GATEWAY_CONNECT_TIMEOUT_SECS` (optional, default 5)
    /// - `ENGINE_GATEWAY_MAX_BODY_BYTES` (optional, default 1 MiB)
    /// - `ENGINE_GATEWAY_LOG` (optional, default `info`) — tracing filter directive
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any name-to-value source, using the same
    /// variable names and rules as [`GatewayConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let engine_addr = lookup("ENGINE_GATEWAY_ENGINE_ADDR")
            .ok_or_else(|| "ENGINE_GATEWAY_ENGINE_ADDR environment variable is not set".to_string())?;

        let bind_addr = lookup("ENGINE_GATEWAY_BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("ENGINE_GATEWAY_PORT") {
            Some(val) => val
                .parse::<u16>()
                .map_err(|_| "ENGINE_GATEWAY_PORT must be a valid port number".to_string())?,
            None => DEFAULT_PORT,
        };

        let connect_timeout_secs = match lookup("ENGINE_GATEWAY_CONNECT_TIMEOUT_SECS") {
            Some(val) => positive::<u64>("ENGINE_GATEWAY_CONNECT_TIMEOUT_SECS", &val)?,
            None => DEFAULT_CONNECT_TIMEOUT_SECS,
        };

        let max_body_bytes = match lookup("ENGINE_GATEWAY_MAX_BODY_BYTES") {
            Some(val) => positive::<usize>("ENGINE_GATEWAY_MAX_BODY_BYTES", &val)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let log_filter = lookup("ENGINE_GATEWAY_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            bind_addr,
            port,
            engine_addr,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            max_body_bytes,
            log_filter,
        })
    }

    /// `addr:port` the HTTP listener binds to.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn positive<T>(name: &str, val: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match val.parse::<T>() {
        Ok(n) if n != T::default() => Ok(n),
        _ => Err(format!("{name} must be a positive integer")),
    }
}
