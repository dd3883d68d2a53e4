use crate::auth::require_identity;
use crate::authz::Identity;
use crate::context::ServerContext;
use crate::db::types::CreateResumeParams;
use crate::error::{Error, Result};
use crate::register_handlers;
use crate::time::current_timestamp;
use crate::types::resume::{CreateResumeRequest, Resume, UserResumesRequest};
use crate::types::Response;

register_handlers!(create_resume, get_user_resumes);

async fn create_resume(
    req: CreateResumeRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<u64>> {
    let identity = require_identity(identity)?;
    if req.user_id != identity.id && !identity.role.is_admin() {
        return Err(Error::denied("You are not allowed to create this resume"));
    }

    let id = sc.db.with_transaction(|tx| {
        tx.create_resume(CreateResumeParams {
            user_id: req.user_id,
            layers: req.layers,
            colors: req.colors,
            now: current_timestamp(),
        })
    })?;

    Ok(Response::created("Resume saved successfully", id))
}

async fn get_user_resumes(
    req: UserResumesRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<Vec<Resume>>> {
    require_identity(identity)?;

    let resumes = sc
        .db
        .with_transaction(|tx| tx.list_user_resumes(req.user_id))?;
    if resumes.is_empty() {
        return Err(Error::NotFound("resume"));
    }
    Ok(Response::with_data(resumes))
}
