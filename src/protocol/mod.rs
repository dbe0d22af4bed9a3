pub mod request;
pub mod response;

pub use request::{EvalRequest, FevalRequest, GetVariableRequest, PutVariableRequest};
pub use response::{
    EvalResponse, FevalResponse, GatewayError, GetVariableResponse, JsonBody, PutVariableResponse,
    VariableResponse, DECODE_FAILURE_MESSAGE,
};
