//! TCP link to an externally started engine.
//!
//! Each acquired session is one connection speaking newline-delimited
//! JSON-RPC 2.0. The engine keeps its workspace between connections, so
//! opening and closing a connection per request is cheap and stateless from
//! the gateway's side.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use super::rpc::{EvalResult, FevalResult, RpcRequest, RpcResponse};
use super::{CapturedOutput, EngineError, EngineSession, SessionProvider};
use crate::codec::OpaqueValue;
use crate::config::GatewayConfig;

/// Session provider for an engine listening on a fixed TCP address.
#[derive(Debug, Clone)]
pub struct RemoteSessionProvider {
    engine_addr: String,
    connect_timeout: Duration,
    max_reply_bytes: usize,
}

impl RemoteSessionProvider {
    pub fn new(engine_addr: impl Into<String>, connect_timeout: Duration, max_reply_bytes: usize) -> Self {
        Self {
            engine_addr: engine_addr.into(),
            connect_timeout,
            max_reply_bytes,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            config.engine_addr.clone(),
            config.connect_timeout,
            config.max_body_bytes,
        )
    }

    pub fn engine_addr(&self) -> &str {
        &self.engine_addr
    }
}

#[async_trait]
impl SessionProvider for RemoteSessionProvider {
    async fn acquire(&self) -> Result<Box<dyn EngineSession>, EngineError> {
        let connect = TcpStream::connect(&self.engine_addr);
        let stream = match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(EngineError::Unavailable(format!(
                    "cannot connect to engine at {}: {e}",
                    self.engine_addr
                )));
            }
            Err(_) => {
                return Err(EngineError::Unavailable(format!(
                    "timed out after {:?} connecting to engine at {}",
                    self.connect_timeout, self.engine_addr
                )));
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "Could not disable Nagle on engine link");
        }

        let (read_half, write_half) = stream.into_split();
        tracing::debug!(engine = %self.engine_addr, "Engine session acquired");

        Ok(Box::new(RemoteSession {
            reader: BufReader::new(read_half),
            writer: write_half,
            next_id: 1,
            max_reply_bytes: self.max_reply_bytes,
        }))
    }
}

struct RemoteSession {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    next_id: u64,
    max_reply_bytes: usize,
}

impl RemoteSession {
    /// Send one request line and wait for its reply.
    async fn call(&mut self, method: &str, params: Value) -> Result<Value, EngineError> {
        let id = self.next_id;
        self.next_id += 1;

        let mut line = serde_json::to_vec(&RpcRequest::new(id, method, params)).map_err(|e| {
            EngineError::Unavailable(format!("cannot encode {method} request: {e}"))
        })?;
        line.push(b'\n');

        self.writer.write_all(&line).await.map_err(link_lost)?;
        self.writer.flush().await.map_err(link_lost)?;

        let limit = (self.max_reply_bytes as u64).saturating_add(1);
        let mut raw = Vec::new();
        let n = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut raw)
            .await
            .map_err(link_lost)?;

        if n == 0 {
            return Err(EngineError::Unavailable(
                "engine closed the connection".to_string(),
            ));
        }
        if n > self.max_reply_bytes {
            return Err(EngineError::Unavailable(format!(
                "engine reply exceeds {} bytes",
                self.max_reply_bytes
            )));
        }

        let reply: RpcResponse = serde_json::from_slice(&raw).map_err(|e| {
            EngineError::Unavailable(format!("unreadable engine reply to {method}: {e}"))
        })?;

        if !reply.answers(id) {
            return Err(EngineError::Unavailable(format!(
                "engine reply to {method} carries the wrong id"
            )));
        }

        if let Some(err) = reply.error {
            tracing::debug!(method, code = err.code, "Engine raised");
            return Err(EngineError::Execution(err.message));
        }

        Ok(reply.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl EngineSession for RemoteSession {
    async fn eval(&mut self, command: &str, output: &mut CapturedOutput) -> Result<(), EngineError> {
        let result = self.call("eval", json!({ "command": command })).await?;
        let streams: EvalResult = parse_result("eval", result)?;
        output.stdout.push_str(&streams.stdout);
        output.stderr.push_str(&streams.stderr);
        Ok(())
    }

    async fn feval(
        &mut self,
        nlhs: i32,
        func: &str,
        args: &[OpaqueValue],
        output: &mut CapturedOutput,
    ) -> Result<OpaqueValue, EngineError> {
        let params = json!({ "nlhs": nlhs, "func": func, "args": args });
        let result = self.call("feval", params).await?;
        let returned: FevalResult = parse_result("feval", result)?;
        output.stdout.push_str(&returned.stdout);
        output.stderr.push_str(&returned.stderr);
        Ok(returned.result)
    }

    async fn get_variable(&mut self, name: &str) -> Result<OpaqueValue, EngineError> {
        let result = self.call("getVariable", json!({ "varName": name })).await?;
        // A bound variable may legitimately hold null, so test for the key.
        match result {
            Value::Object(mut fields) => match fields.remove("varData") {
                Some(value) => Ok(OpaqueValue::new(value)),
                None => Err(EngineError::Execution(format!("Undefined variable '{name}'"))),
            },
            _ => Err(EngineError::Execution(format!("Undefined variable '{name}'"))),
        }
    }

    async fn put_variable(&mut self, name: &str, value: &OpaqueValue) -> Result<(), EngineError> {
        self.call("putVariable", json!({ "varName": name, "varData": value }))
            .await
            .map(|_| ())
    }

    async fn disconnect(self: Box<Self>) {
        let mut session = self;
        if let Err(e) = session.writer.shutdown().await {
            tracing::debug!(error = %e, "Engine session shutdown failed");
        }
    }
}

fn link_lost(e: std::io::Error) -> EngineError {
    EngineError::Unavailable(format!("lost connection to engine: {e}"))
}

fn parse_result<T>(method: &str, result: Value) -> Result<T, EngineError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if result.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(result).map_err(|e| {
        EngineError::Unavailable(format!("unreadable engine result for {method}: {e}"))
    })
}
