use async_trait::async_trait;

use super::Operation;
use crate::engine::{CapturedOutput, EngineError, EngineSession};
use crate::protocol::{FevalRequest, FevalResponse};

/// `/feval`: call a named function.
pub struct Feval;

#[async_trait]
impl Operation for Feval {
    type Request = FevalRequest;
    type Response = FevalResponse;

    async fn execute(
        &self,
        session: &mut dyn EngineSession,
        request: FevalRequest,
    ) -> Result<FevalResponse, EngineError> {
        handle(session, request).await
    }
}

/// Handle a `feval` request.
///
/// The engine's result is returned as-is, whatever shape it uses for
/// multiple return values.
pub async fn handle(
    session: &mut dyn EngineSession,
    request: FevalRequest,
) -> Result<FevalResponse, EngineError> {
    let mut output = CapturedOutput::default();
    let result = session
        .feval(request.nlhs, &request.func, &request.args, &mut output)
        .await?;

    Ok(FevalResponse {
        incoming_args: request,
        result,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}
