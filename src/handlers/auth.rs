use actix_web::cookie::time::Duration;
use actix_web::cookie::Cookie;
use log::debug;

use crate::auth::ACCESS_TOKEN_COOKIE;
use crate::authz::{Identity, Role};
use crate::code;
use crate::context::ServerContext;
use crate::db::types::CreateUserParams;
use crate::error::{Error, Result};
use crate::register_handlers;
use crate::time::current_timestamp;
use crate::types::user::{SignInRequest, SignInResponse, SignUpRequest, User};
use crate::types::{EmptyRequest, Response};

register_handlers!(sign_up, sign_in, sign_out);

async fn sign_up(
    req: SignUpRequest,
    _identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<User>> {
    debug!("Sign up user {} <{}>", req.username, req.email);

    let salt = code::generate_salt(sc.cfg.salt_length);
    let password = code::hash_password(&req.password, &salt);

    let user = sc.db.with_transaction(|tx| {
        if tx.has_user_conflict(Some(&req.username), Some(&req.email), None)? {
            return Err(Error::conflict("Username or email already exists").into());
        }

        let id = tx.create_user(CreateUserParams {
            username: req.username,
            email: req.email,
            password,
            salt,
            role: Role::User,
            now: current_timestamp(),
        })?;
        tx.get_user(id)?.ok_or_else(|| Error::NotFound("user").into())
    })?;

    Ok(Response::created("Signup successful", user))
}

async fn sign_in(
    req: SignInRequest,
    _identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<SignInResponse>> {
    let user = sc.db.with_transaction(|tx| {
        let up = match tx.get_user_password(&req.email)? {
            Some(up) => up,
            None => return Ok(None),
        };
        if !code::verify_password(&req.password, &up.salt, &up.password) {
            return Ok(None);
        }
        tx.get_user(up.id)
    })?;

    // Unknown email and wrong password look the same to the caller
    let user = match user {
        Some(user) => user,
        None => return Err(Error::validation("Invalid email or password")),
    };

    let identity = Identity {
        id: user.id,
        role: user.role.clone(),
    };
    let token = sc
        .jwt_generator
        .generate_token(&identity, current_timestamp())?;
    debug!("User {} signed in, token expires at {}", user.id, token.expire_after);

    let cookie = Cookie::build(ACCESS_TOKEN_COOKIE, token.token.clone())
        .path("/")
        .http_only(true)
        .secure(sc.cfg.secure_cookie)
        .max_age(Duration::seconds(sc.cfg.token_expiration_secs as i64))
        .finish();

    let resp = SignInResponse {
        user,
        token: token.token,
        expire_after: token.expire_after,
    };
    Ok(Response::with_data(resp).set_cookie(cookie))
}

async fn sign_out(
    _req: EmptyRequest,
    _identity: Option<Identity>,
    _sc: &ServerContext,
) -> Result<Response<()>> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    Ok(Response::with_message("User has been signed out").set_cookie(cookie))
}
