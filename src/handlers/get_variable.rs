use async_trait::async_trait;

use super::Operation;
use crate::engine::{EngineError, EngineSession};
use crate::protocol::{GetVariableRequest, GetVariableResponse};

/// `/getVariable`
pub struct GetVariable;

#[async_trait]
impl Operation for GetVariable {
    type Request = GetVariableRequest;
    type Response = GetVariableResponse;

    async fn execute(
        &self,
        session: &mut dyn EngineSession,
        request: GetVariableRequest,
    ) -> Result<GetVariableResponse, EngineError> {
        handle(session, request).await
    }
}

pub async fn handle(
    session: &mut dyn EngineSession,
    request: GetVariableRequest,
) -> Result<GetVariableResponse, EngineError> {
    let var_data = session.get_variable(&request.var_name).await?;

    Ok(GetVariableResponse {
        var_name: request.var_name,
        var_data,
    })
}
