use std::collections::HashMap;

use actix_web::web::Bytes;
use actix_web::HttpRequest;
use anyhow::{bail, Context, Result};
use log::debug;
use url::form_urlencoded;

use crate::types::Request;

#[macro_export]
macro_rules! parse_request {
    ($req:expr, $body:expr) => {
        match $crate::request::parse_request_raw(&$req, $body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return $crate::types::Response::error($crate::error::Error::Validation(format!(
                    "{e:#}"
                )))
            }
        }
    };
}

/// Builds `T` from the path segments, the query string and, for data
/// requests, the JSON body. Path segments win over query fields of the same
/// name.
pub fn parse_request_raw<T>(req: &HttpRequest, body: Option<Bytes>) -> Result<T>
where
    T: Request,
{
    let query_string = req.query_string();

    let mut fields: HashMap<String, String> = form_urlencoded::parse(query_string.as_bytes())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    for (key, value) in req.match_info().iter() {
        fields.insert(key.to_string(), value.to_string());
    }

    let body = body.filter(|b| !b.is_empty());
    debug!(
        "- {} {}, fields: {:?}, peer: {:?}, with_body: {:?}",
        req.method(),
        req.path(),
        fields,
        req.peer_addr(),
        body.is_some()
    );

    let mut parsed = T::default();

    if parsed.is_data() {
        match body {
            Some(data) => parsed.complete_data(&data).context("parse body")?,
            None => bail!("request body is required"),
        }
    }

    parsed.complete(fields).context("parse fields")?;

    Ok(parsed)
}
