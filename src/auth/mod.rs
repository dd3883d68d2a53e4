pub mod jwt;

use actix_web::http::header;
use actix_web::HttpRequest;
use anyhow::{bail, Result};
use log::debug;

use crate::authz::Identity;
use crate::context::ServerContext;
use crate::error::Error;
use crate::time::current_timestamp;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Resolves the caller from a bearer token, falling back to the
/// `access_token` cookie. A missing or invalid credential yields `None`;
/// routes that need a caller reject that with [`require_identity`].
pub fn identify(sc: &ServerContext, req: &HttpRequest) -> Option<Identity> {
    let token = match read_token(req) {
        Ok(Some(token)) => token,
        Ok(None) => return None,
        Err(e) => {
            debug!("Ignore credential of {}: {e:#}", req.path());
            return None;
        }
    };

    match sc.jwt_validator.validate_token(&token, current_timestamp()) {
        Ok(identity) => Some(identity),
        Err(e) => {
            debug!("Ignore credential of {}: {e:#}", req.path());
            None
        }
    }
}

pub fn require_identity(identity: Option<Identity>) -> Result<Identity, Error> {
    identity.ok_or(Error::Unauthenticated)
}

fn read_token(req: &HttpRequest) -> Result<Option<String>> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let value = match value.to_str() {
            Ok(s) => s,
            Err(_) => bail!("invalid authorization header value"),
        };

        let fields = value.split_whitespace().collect::<Vec<&str>>();
        if fields.len() != 2 {
            bail!("invalid authorization header format");
        }
        if !fields[0].eq_ignore_ascii_case("bearer") {
            bail!("unsupported authorization type '{}'", fields[0]);
        }
        return Ok(Some(fields[1].to_string()));
    }

    Ok(req
        .cookie(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty()))
}
