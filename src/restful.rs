use std::sync::Arc;
use std::time::Duration;

use actix_web::web::{self, Data, PayloadConfig};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use log::{info, warn};
use openssl::ssl::SslAcceptorBuilder;
use sd_notify::NotifyState;

use crate::context::ServerContext;
use crate::error::Error;
use crate::handlers::{self, auth, comment, healthz, post, resume, user};
use crate::types::Response;

pub struct RestfulServer {
    ssl: Option<SslAcceptorBuilder>,
    ctx: Arc<ServerContext>,

    keep_alive_secs: Option<u64>,
    workers: Option<u64>,

    bind: String,

    payload_limit_mib: u64,
}

impl RestfulServer {
    const DEFAULT_PAYLOAD_LIMIT_MIB: u64 = 5;

    pub fn new(bind: String, ctx: Arc<ServerContext>) -> Self {
        Self {
            ssl: None,
            ctx,
            keep_alive_secs: None,
            workers: None,
            bind,
            payload_limit_mib: Self::DEFAULT_PAYLOAD_LIMIT_MIB,
        }
    }

    pub fn set_ssl(&mut self, ssl: SslAcceptorBuilder) {
        self.ssl = Some(ssl);
    }

    pub fn set_keep_alive_secs(&mut self, keep_alive_secs: u64) {
        self.keep_alive_secs = Some(keep_alive_secs);
    }

    pub fn set_workers(&mut self, workers: u64) {
        self.workers = Some(workers);
    }

    pub fn set_payload_limit_mib(&mut self, payload_limit_mib: u64) {
        self.payload_limit_mib = payload_limit_mib;
    }

    pub async fn run(mut self) -> Result<()> {
        let ctx = self.ctx.clone();
        let payload_limit = (self.payload_limit_mib * 1024 * 1024) as usize;
        let mut srv = HttpServer::new(move || {
            App::new()
                .app_data(Data::new(ctx.clone()))
                .app_data(PayloadConfig::new(payload_limit))
                .configure(configure)
        });

        if let Some(ssl) = self.ssl.take() {
            info!("Binding to https://{}", self.bind);
            srv = srv.bind_openssl(&self.bind, ssl).context("bind with ssl")?
        } else {
            warn!("Using HTTP (without SSL), tokens are sent in clear text");
            info!("Binding to http://{}", self.bind);
            srv = srv.bind(&self.bind).context("bind without ssl")?
        };

        if let Some(keep_alive) = self.keep_alive_secs {
            srv = srv.keep_alive(Duration::from_secs(keep_alive));
        }
        if let Some(workers) = self.workers {
            srv = srv.workers(workers as usize);
        }

        sd_notify::notify(true, &[NotifyState::Ready]).context("notify systemd")?;
        info!("Starting restful server");
        srv.run().await.context("run server")?;

        info!("Server stopped by user");
        Ok(())
    }
}

/// The route table. Shared by [`RestfulServer`] and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/auth/sign-up", web::post().to(auth::sign_up_handler))
            .route("/auth/sign-in", web::post().to(auth::sign_in_handler))
            .route("/user/signout", web::post().to(auth::sign_out_handler))
            // Before `/user/{userId}`, which would swallow it
            .route("/user/getusers", web::get().to(user::get_users_handler))
            .route("/user/{userId}", web::get().to(user::get_user_handler))
            .route(
                "/user/update/{userId}",
                web::put().to(user::update_user_handler),
            )
            .route(
                "/user/delete/{userId}",
                web::delete().to(user::delete_user_handler),
            )
            .route("/post/create", web::post().to(post::create_post_handler))
            .route("/post/getposts", web::get().to(post::get_posts_handler))
            .route(
                "/post/getUserPosts",
                web::get().to(post::get_user_posts_handler),
            )
            .route(
                "/post/updatepost/{postId}/{userId}",
                web::put().to(post::update_post_handler),
            )
            .route(
                "/post/deletepost/{postId}/{userId}",
                web::delete().to(post::delete_post_handler),
            )
            .route(
                "/comment/create",
                web::post().to(comment::create_comment_handler),
            )
            .route(
                "/comment/getPostComments/{postId}",
                web::get().to(comment::get_post_comments_handler),
            )
            .route(
                "/comment/likeComment/{commentId}",
                web::put().to(comment::like_comment_handler),
            )
            .route(
                "/comment/editComment/{commentId}",
                web::put().to(comment::edit_comment_handler),
            )
            .route(
                "/comment/deleteComment/{commentId}",
                web::delete().to(comment::delete_comment_handler),
            )
            .route(
                "/comment/getcomments",
                web::get().to(comment::get_comments_handler),
            )
            .route(
                "/resume/create",
                web::post().to(resume::create_resume_handler),
            )
            .route(
                "/resume/resumes/user/{userId}",
                web::get().to(resume::get_user_resumes_handler),
            ),
    )
    .route("/healthz", web::get().to(healthz::get_healthz_handler))
    .default_service(web::route().to(default_handler));
}

async fn default_handler(req: HttpRequest) -> HttpResponse {
    let path = req.uri().path();
    let method = req.method().as_str();
    let err = Error::NotFound("route");
    let mut resp = Response::<()>::error(err);
    resp.message = Some(format!("No route to {method} {path}"));
    handlers::convert_response(resp)
}
