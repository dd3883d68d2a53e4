use crate::authz::Identity;
use crate::context::ServerContext;
use crate::error::Result;
use crate::register_handlers;
use crate::time::current_timestamp;
use crate::types::{EmptyRequest, HealthResponse, Response};

register_handlers!(get_healthz);

async fn get_healthz(
    _req: EmptyRequest,
    _identity: Option<Identity>,
    _sc: &ServerContext,
) -> Result<Response<HealthResponse>> {
    Ok(Response::with_data(HealthResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: current_timestamp(),
    }))
}
