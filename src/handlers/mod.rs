use actix_web::HttpResponse;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::{self, Response};

pub mod auth;
pub mod comment;
pub mod healthz;
pub mod post;
pub mod resume;
pub mod user;

/// Wraps each `async fn name(req, identity, sc) -> Result<Response<T>>` into an
/// actix handler `name_handler`. The caller identity is resolved first but
/// only enforced by the handler itself, and request parsing failures answer
/// 400 before the handler runs.
#[macro_export]
macro_rules! register_handlers {
    ($handler:ident) => {
        paste::paste! {
            pub async fn [< $handler _handler >](
                req: actix_web::HttpRequest,
                body: Option<actix_web::web::Bytes>,
                sc: actix_web::web::Data<std::sync::Arc<$crate::context::ServerContext>>,
            ) -> actix_web::HttpResponse {
                let f = || async move {
                    let identity = $crate::auth::identify(sc.as_ref(), &req);
                    let req = $crate::parse_request!(req, body);
                    match $handler(req, identity, sc.as_ref()).await {
                        Ok(resp) => resp,
                        Err(err) => $crate::types::Response::error(err),
                    }
                };
                let resp = f().await;
                $crate::handlers::convert_response(resp)
            }
        }
    };

    ($handler:ident, $($rest:ident),* $(,)?) => {
        $crate::register_handlers!($handler);
        $crate::register_handlers!($($rest),*);
    };
}

pub fn convert_response<T>(mut resp: Response<T>) -> HttpResponse
where
    T: Serialize + DeserializeOwned,
{
    let mut http_resp = match resp.status_code {
        types::STATUS_OK => HttpResponse::Ok(),
        types::STATUS_CREATED => HttpResponse::Created(),
        types::STATUS_BAD_REQUEST => HttpResponse::BadRequest(),
        types::STATUS_UNAUTHORIZED => HttpResponse::Unauthorized(),
        types::STATUS_FORBIDDEN => HttpResponse::Forbidden(),
        types::STATUS_NOT_FOUND => HttpResponse::NotFound(),
        types::STATUS_CONFLICT => HttpResponse::Conflict(),
        _ => HttpResponse::InternalServerError(),
    };
    if let Some(cookie) = resp.cookie.take() {
        http_resp.cookie(cookie);
    }
    http_resp.json(resp)
}
