//! Recording stub engine shared by the integration tests.
//!
//! The stub understands a handful of commands and functions, keeps a
//! workspace of variables, and records every acquire, release and operation
//! so tests can assert on exactly what reached the engine.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use engine_gateway::codec::OpaqueValue;
use engine_gateway::engine::{
    disconnect_detached, CapturedOutput, EngineError, EngineSession, SessionProvider,
};
use engine_gateway::server::build_router;
use engine_gateway::worker;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Everything the stub has observed.
#[derive(Debug, Default)]
pub struct StubState {
    pub variables: HashMap<String, Value>,
    /// One entry per engine operation, e.g. `eval:1+1` or `putVariable:x=42`.
    pub operations: Vec<String>,
    pub acquires: usize,
    pub releases: usize,
    pub disconnects: usize,
    pub in_flight: usize,
    pub max_in_flight: usize,
}

#[derive(Debug, Clone)]
pub struct StubProvider {
    state: Arc<Mutex<StubState>>,
    available: bool,
    op_delay: Duration,
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StubState::default())),
            available: true,
            op_delay: Duration::ZERO,
        }
    }

    /// A provider whose engine is not running.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Every operation sleeps for `delay` before completing.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            op_delay: delay,
            ..Self::new()
        }
    }

    pub fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap()
    }

    pub fn operations(&self) -> Vec<String> {
        self.state().operations.clone()
    }

    pub fn releases(&self) -> usize {
        self.state().releases
    }

    pub fn bind(&self, name: &str, value: Value) {
        self.state().variables.insert(name.to_string(), value);
    }
}

#[async_trait]
impl SessionProvider for StubProvider {
    async fn acquire(&self) -> Result<Box<dyn EngineSession>, EngineError> {
        self.state().acquires += 1;
        if !self.available {
            return Err(EngineError::Unavailable(
                "no shared engine session is running".to_string(),
            ));
        }
        Ok(Box::new(StubSession {
            state: Arc::clone(&self.state),
            op_delay: self.op_delay,
        }))
    }

    fn release(&self, session: Option<Box<dyn EngineSession>>) {
        self.state().releases += 1;
        if let Some(session) = session {
            disconnect_detached(session);
        }
    }
}

struct StubSession {
    state: Arc<Mutex<StubState>>,
    op_delay: Duration,
}

impl StubSession {
    async fn enter(&self, operation: String) {
        {
            let mut state = self.state.lock().unwrap();
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.operations.push(operation);
        }
        if !self.op_delay.is_zero() {
            tokio::time::sleep(self.op_delay).await;
        }
    }

    fn leave(&self) {
        self.state.lock().unwrap().in_flight -= 1;
    }
}

#[async_trait]
impl EngineSession for StubSession {
    async fn eval(&mut self, command: &str, output: &mut CapturedOutput) -> Result<(), EngineError> {
        self.enter(format!("eval:{command}")).await;
        let result = run_command(command, output);
        self.leave();
        result
    }

    async fn feval(
        &mut self,
        nlhs: i32,
        func: &str,
        args: &[OpaqueValue],
        output: &mut CapturedOutput,
    ) -> Result<OpaqueValue, EngineError> {
        self.enter(format!("feval:{func}/{nlhs}")).await;
        let result = call_function(nlhs, func, args, output);
        self.leave();
        result
    }

    async fn get_variable(&mut self, name: &str) -> Result<OpaqueValue, EngineError> {
        self.enter(format!("getVariable:{name}")).await;
        let found = self.state.lock().unwrap().variables.get(name).cloned();
        self.leave();
        found
            .map(OpaqueValue::new)
            .ok_or_else(|| EngineError::Execution(format!("Undefined variable '{name}'.")))
    }

    async fn put_variable(&mut self, name: &str, value: &OpaqueValue) -> Result<(), EngineError> {
        self.enter(format!("putVariable:{name}={}", value.as_json())).await;
        self.state
            .lock()
            .unwrap()
            .variables
            .insert(name.to_string(), value.as_json().clone());
        self.leave();
        Ok(())
    }

    async fn disconnect(self: Box<Self>) {
        self.state.lock().unwrap().disconnects += 1;
    }
}

/// `a+b` prints the sum, `disp(x)` prints `x`, `warning(x)` writes to
/// stderr, `error(x)` raises `x`, `crash(x)` panics. Anything else is undefined.
fn run_command(command: &str, output: &mut CapturedOutput) -> Result<(), EngineError> {
    if let Some(msg) = call_arg(command, "crash") {
        panic!("engine session crashed: {msg}");
    }
    if let Some(msg) = call_arg(command, "error") {
        output.stdout.push_str("partial output\n");
        return Err(EngineError::Execution(msg.to_string()));
    }
    if let Some(text) = call_arg(command, "disp") {
        output.stdout.push_str(&format!("{text}\n"));
        return Ok(());
    }
    if let Some(text) = call_arg(command, "warning") {
        output.stderr.push_str(&format!("Warning: {text}\n"));
        return Ok(());
    }
    if let Some((lhs, rhs)) = command.split_once('+') {
        if let (Ok(a), Ok(b)) = (lhs.trim().parse::<i64>(), rhs.trim().parse::<i64>()) {
            output.stdout.push_str(&format!("{}\n", a + b));
            return Ok(());
        }
    }
    Err(EngineError::Execution(format!(
        "Undefined function or variable '{command}'."
    )))
}

fn call_arg<'a>(command: &'a str, name: &str) -> Option<&'a str> {
    command
        .strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

/// `plus` sums numbers, `deal` hands its arguments back (an array when more
/// than one value is requested), `fprintf` prints its first argument.
fn call_function(
    nlhs: i32,
    func: &str,
    args: &[OpaqueValue],
    output: &mut CapturedOutput,
) -> Result<OpaqueValue, EngineError> {
    match func {
        "plus" => {
            if args.len() != 2 {
                return Err(EngineError::Execution("Too many input arguments.".to_string()));
            }
            let mut sum = 0.0;
            for arg in args {
                sum += arg.as_json().as_f64().ok_or_else(|| {
                    EngineError::Execution("Arguments must be numeric.".to_string())
                })?;
            }
            Ok(OpaqueValue::new(json!(sum)))
        }
        "deal" => match nlhs {
            0 => Ok(OpaqueValue::null()),
            1 => Ok(args.first().cloned().unwrap_or_default()),
            _ => Ok(OpaqueValue::new(Value::Array(
                args.iter().map(|a| a.as_json().clone()).collect(),
            ))),
        },
        "fprintf" => {
            let text = args
                .first()
                .and_then(|a| a.as_json().as_str())
                .unwrap_or_default();
            output.stdout.push_str(text);
            Ok(OpaqueValue::null())
        }
        "raise" => Err(EngineError::Execution(String::new())),
        _ => Err(EngineError::Execution(format!(
            "Undefined function '{func}' for input arguments of type 'double'."
        ))),
    }
}

/// A router wired to `provider` through a fresh request worker.
pub fn router_for(provider: &StubProvider) -> Router {
    router_with_limit(provider, 1024 * 1024)
}

pub fn router_with_limit(provider: &StubProvider, max_body_bytes: usize) -> Router {
    let worker = worker::spawn(Arc::new(provider.clone()));
    build_router(worker, max_body_bytes)
}

/// Status, content type and body text of one response.
pub struct Reply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub async fn send(router: &Router, method: &str, path: &str, body: &str) -> Reply {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    Reply {
        status,
        content_type,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn post(router: &Router, path: &str, body: &str) -> Reply {
    send(router, "POST", path, body).await
}
