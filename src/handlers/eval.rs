use async_trait::async_trait;

use super::Operation;
use crate::engine::{CapturedOutput, EngineError, EngineSession};
use crate::protocol::{EvalRequest, EvalResponse};

/// `/eval`: run a statement, returning only what it printed.
pub struct Eval;

#[async_trait]
impl Operation for Eval {
    type Request = EvalRequest;
    type Response = EvalResponse;

    async fn execute(
        &self,
        session: &mut dyn EngineSession,
        request: EvalRequest,
    ) -> Result<EvalResponse, EngineError> {
        handle(session, request).await
    }
}

/// Handle an `eval` request.
pub async fn handle(
    session: &mut dyn EngineSession,
    request: EvalRequest,
) -> Result<EvalResponse, EngineError> {
    let mut output = CapturedOutput::default();
    session.eval(&request.command, &mut output).await?;

    Ok(EvalResponse {
        incoming_args: request,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}
