use async_trait::async_trait;

use super::Operation;
use crate::engine::{EngineError, EngineSession};
use crate::protocol::{PutVariableRequest, PutVariableResponse};

/// `/putVariable`
pub struct PutVariable;

#[async_trait]
impl Operation for PutVariable {
    type Request = PutVariableRequest;
    type Response = PutVariableResponse;

    async fn execute(
        &self,
        session: &mut dyn EngineSession,
        request: PutVariableRequest,
    ) -> Result<PutVariableResponse, EngineError> {
        handle(session, request).await
    }
}

/// Handle a `putVariable` request.
///
/// The reply echoes the value that was sent, not a read-back from the
/// engine.
pub async fn handle(
    session: &mut dyn EngineSession,
    request: PutVariableRequest,
) -> Result<PutVariableResponse, EngineError> {
    session
        .put_variable(&request.var_name, &request.var_data)
        .await?;

    Ok(PutVariableResponse {
        var_name: request.var_name,
        var_data: request.var_data,
    })
}
