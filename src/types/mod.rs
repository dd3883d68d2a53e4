pub mod comment;
pub mod post;
pub mod resume;
pub mod user;

use std::collections::HashMap;

use actix_web::cookie::Cookie;
use anyhow::{Context, Result};
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::db::query;
use crate::error::Error;

#[macro_export]
macro_rules! parse_from_map {
    ($fields:expr,$field:expr) => {
        match $fields.get($field) {
            Some(value) if value.is_empty() => None,
            Some(value) => match value.parse() {
                Ok(value) => Some(value),
                Err(_) => anyhow::bail!(format!("{} is invalid", $field)),
            },
            None => None,
        }
    };
}

/// Parsed input of one route. Path segments and query string arrive through
/// [`Request::complete`]; requests carrying a JSON body also get
/// [`Request::complete_data`], which runs first.
pub trait Request: Default {
    fn complete(&mut self, _fields: HashMap<String, String>) -> Result<()> {
        Ok(())
    }

    fn is_data(&self) -> bool {
        false
    }

    fn complete_data(&mut self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Decodes a JSON request body, naming the payload in the error.
pub fn parse_json<T: DeserializeOwned>(data: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(data).with_context(|| format!("parse {what} json"))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyRequest;

impl Request for EmptyRequest {}

/// Pagination and sort shared by the listing routes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageRequest {
    pub start_index: Option<i64>,
    pub limit: Option<i64>,
    pub ascending: bool,
}

impl PageRequest {
    /// `sort_field` is `order` for posts and `sort` for users.
    pub fn parse(fields: &HashMap<String, String>, sort_field: &str) -> Result<Self> {
        let start_index: Option<i64> = parse_from_map!(fields, "startIndex");
        let limit: Option<i64> = parse_from_map!(fields, "limit");
        let ascending = match fields.get(sort_field).map(|s| s.as_str()) {
            None | Some("") | Some("desc") => false,
            Some("asc") => true,
            Some(s) => anyhow::bail!("{sort_field} must be 'asc' or 'desc', found '{s}'"),
        };
        Ok(Self {
            start_index,
            limit,
            ascending,
        })
    }

    pub fn offset(&self) -> Result<i64, Error> {
        let start_index = self.start_index.unwrap_or(query::DEFAULT_START_INDEX);
        if start_index < 0 {
            return Err(Error::validation("startIndex must not be negative"));
        }
        Ok(start_index)
    }

    pub fn limit(&self) -> Result<i64, Error> {
        let limit = self.limit.unwrap_or(query::DEFAULT_LIMIT);
        if limit <= 0 {
            return Err(Error::validation("limit must be greater than 0"));
        }
        Ok(limit)
    }
}

/// The response envelope shared by every route.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
pub struct Response<T: Serialize + DeserializeOwned> {
    pub success: bool,

    #[serde(rename = "statusCode")]
    pub status_code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip)]
    pub cookie: Option<Cookie<'static>>,
}

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_FORBIDDEN: u16 = 403;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

impl<T: Serialize + DeserializeOwned> Response<T> {
    pub fn with_data(data: T) -> Self {
        Self::with_status(STATUS_OK, None, Some(data))
    }

    pub fn with_message(message: impl ToString) -> Self {
        Self::with_status(STATUS_OK, Some(message.to_string()), None)
    }

    pub fn created(message: impl ToString, data: T) -> Self {
        Self::with_status(STATUS_CREATED, Some(message.to_string()), Some(data))
    }

    pub fn set_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn error(err: Error) -> Self {
        let status_code = err.status_code();
        let message = match err {
            Error::Upstream(ref e) => {
                error!("Upstream failure: {e:#}");
                String::from("Internal server error")
            }
            err => {
                debug!("Request rejected with {status_code}: {err}");
                err.to_string()
            }
        };
        let mut resp = Self::with_status(status_code, Some(message), None);
        resp.success = false;
        resp
    }

    fn with_status(status_code: u16, message: Option<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            status_code,
            message,
            data,
            cookie: None,
        }
    }
}

impl<T: Serialize + DeserializeOwned> From<Error> for Response<T> {
    fn from(err: Error) -> Self {
        Self::error(err)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub version: String,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_page_request() {
        let page = PageRequest::parse(&fields(&[]), "order").unwrap();
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.offset().unwrap(), 0);
        assert_eq!(page.limit().unwrap(), 9);

        let page = PageRequest::parse(
            &fields(&[("startIndex", "18"), ("limit", "3"), ("sort", "asc")]),
            "sort",
        )
        .unwrap();
        assert_eq!(page.offset().unwrap(), 18);
        assert_eq!(page.limit().unwrap(), 3);
        assert!(page.ascending);

        let page = PageRequest::parse(&fields(&[("limit", "0")]), "order").unwrap();
        assert!(matches!(page.limit(), Err(Error::Validation(_))));
        let page = PageRequest::parse(&fields(&[("startIndex", "-1")]), "order").unwrap();
        assert!(matches!(page.offset(), Err(Error::Validation(_))));

        assert!(PageRequest::parse(&fields(&[("limit", "many")]), "order").is_err());
        assert!(PageRequest::parse(&fields(&[("order", "up")]), "order").is_err());
    }

    #[test]
    fn test_response_json() {
        let resp: Response<u64> = Response::created("done", 7);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "statusCode": 201, "message": "done", "data": 7})
        );

        let resp: Response<()> = Error::NotFound("post").into();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "statusCode": 404, "message": "post not found"})
        );

        let resp: Response<()> = Error::Upstream(anyhow::anyhow!("disk full")).into();
        assert_eq!(resp.status_code, STATUS_INTERNAL_SERVER_ERROR);
        assert_eq!(resp.message.as_deref(), Some("Internal server error"));
    }
}
