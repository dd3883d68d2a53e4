use chrono::Local;
use log::debug;

use crate::auth::require_identity;
use crate::authz::Identity;
use crate::code;
use crate::context::ServerContext;
use crate::db::types::{Page, PatchUserParams};
use crate::error::{Error, Result};
use crate::register_handlers;
use crate::time::{current_timestamp, last_month_threshold};
use crate::types::user::{GetUsersRequest, UpdateUserRequest, User, UserIdRequest, UsersResponse};
use crate::types::Response;

register_handlers!(get_users, get_user, update_user, delete_user);

async fn get_users(
    req: GetUsersRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<UsersResponse>> {
    let identity = require_identity(identity)?;
    if !sc.policy.can_list_all_users(Some(&identity)) {
        return Err(Error::denied("You are not allowed to see all users"));
    }

    let page = Page {
        offset: req.page.offset()?,
        limit: req.page.limit()?,
        ascending: req.page.ascending,
    };
    let threshold = last_month_threshold(Local::now());

    let resp = sc.db.with_transaction(|tx| {
        let users = tx.list_users(page)?;
        let total_users = tx.count_users(None)?;
        let last_month_users = match threshold {
            Some(threshold) => tx.count_users(Some(threshold))?,
            None => 0,
        };
        Ok(UsersResponse {
            users,
            total_users,
            last_month_users,
        })
    })?;

    Ok(Response::with_data(resp))
}

async fn get_user(
    req: UserIdRequest,
    _identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<User>> {
    let user = sc.db.with_transaction(|tx| tx.get_user(req.user_id))?;
    match user {
        Some(user) => Ok(Response::with_data(user)),
        None => Err(Error::NotFound("user")),
    }
}

async fn update_user(
    mut req: UpdateUserRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<User>> {
    let identity = require_identity(identity)?;
    if identity.id != req.user_id {
        return Err(Error::denied("You are not allowed to update this user"));
    }
    debug!("Update user {}", req.user_id);

    let salt = match req.patch.password.take() {
        Some(password) => {
            let salt = code::generate_salt(sc.cfg.salt_length);
            req.patch.password = Some(code::hash_password(&password, &salt));
            Some(salt)
        }
        None => None,
    };

    let user = sc.db.with_transaction(|tx| {
        if tx.get_user(req.user_id)?.is_none() {
            return Err(Error::NotFound("user").into());
        }
        let conflict = tx.has_user_conflict(
            req.patch.username.as_deref(),
            req.patch.email.as_deref(),
            Some(req.user_id),
        )?;
        if conflict {
            return Err(Error::conflict("Username or email already exists").into());
        }

        tx.update_user(PatchUserParams {
            id: req.user_id,
            patch: req.patch,
            salt,
            updated_at: current_timestamp(),
        })?;
        tx.get_user(req.user_id)?
            .ok_or_else(|| Error::NotFound("user").into())
    })?;

    Ok(Response::with_data(user))
}

async fn delete_user(
    req: UserIdRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<()>> {
    let identity = require_identity(identity)?;
    if identity.id != req.user_id && !identity.role.is_admin() {
        return Err(Error::denied("You are not allowed to delete this user"));
    }
    debug!("User {} deletes user {}", identity.id, req.user_id);

    let deleted = sc.db.with_transaction(|tx| tx.delete_user(req.user_id))?;
    if !deleted {
        return Err(Error::NotFound("user"));
    }
    Ok(Response::with_message("User has been deleted"))
}
