use chrono::Local;
use log::debug;

use crate::auth::require_identity;
use crate::authz::Identity;
use crate::context::ServerContext;
use crate::db::types::{CreateCommentParams, Page, Transaction};
use crate::error::{Error, Result};
use crate::register_handlers;
use crate::time::{current_timestamp, last_month_threshold};
use crate::types::comment::{
    Comment, CommentIdRequest, CommentsResponse, CreateCommentRequest, EditCommentRequest,
    GetCommentsRequest, PostCommentsRequest,
};
use crate::types::Response;

register_handlers!(
    create_comment,
    get_post_comments,
    like_comment,
    edit_comment,
    delete_comment,
    get_comments,
);

async fn create_comment(
    req: CreateCommentRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<Comment>> {
    let identity = require_identity(identity)?;
    if req.user_id != identity.id {
        return Err(Error::denied("You are not allowed to create this comment"));
    }

    let comment = sc.db.with_transaction(|tx| {
        if tx.get_post(req.post_id)?.is_none() {
            return Err(Error::NotFound("post").into());
        }
        let id = tx.create_comment(CreateCommentParams {
            content: req.content,
            post_id: req.post_id,
            user_id: identity.id,
            now: current_timestamp(),
        })?;
        get_comment(tx, id)
    })?;

    Ok(Response::created("Comment created", comment))
}

async fn get_post_comments(
    req: PostCommentsRequest,
    _identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<Vec<Comment>>> {
    let comments = sc
        .db
        .with_transaction(|tx| tx.list_post_comments(req.post_id))?;
    Ok(Response::with_data(comments))
}

async fn like_comment(
    req: CommentIdRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<Comment>> {
    let identity = require_identity(identity)?;

    let comment = sc.db.with_transaction(|tx| {
        let mut comment = get_comment(tx, req.comment_id)?;
        comment.toggle_like(identity.id);
        tx.update_comment_likes(comment.id, &comment.likes)?;
        get_comment(tx, comment.id)
    })?;

    Ok(Response::with_data(comment))
}

async fn edit_comment(
    req: EditCommentRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<Comment>> {
    let identity = require_identity(identity)?;

    let comment = sc.db.with_transaction(|tx| {
        let comment = get_comment(tx, req.comment_id)?;
        if !sc.policy.can_modify_comment(Some(&identity), &comment) {
            return Err(Error::denied("You are not allowed to edit this comment").into());
        }
        tx.update_comment_content(comment.id, &req.content, current_timestamp())?;
        get_comment(tx, comment.id)
    })?;

    Ok(Response::with_data(comment))
}

async fn delete_comment(
    req: CommentIdRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<()>> {
    let identity = require_identity(identity)?;

    sc.db.with_transaction(|tx| {
        let comment = get_comment(tx, req.comment_id)?;
        if !sc.policy.can_modify_comment(Some(&identity), &comment) {
            return Err(Error::denied("You are not allowed to delete this comment").into());
        }
        tx.delete_comment(comment.id)?;
        debug!("User {} deleted comment {}", identity.id, comment.id);
        Ok(())
    })?;

    Ok(Response::with_message("Comment has been deleted"))
}

async fn get_comments(
    req: GetCommentsRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<CommentsResponse>> {
    let identity = require_identity(identity)?;
    if !identity.role.is_known() {
        return Err(Error::denied("You are not allowed to see comments"));
    }

    // Admins see every comment, everyone else only their own
    let author = if identity.role.is_admin() {
        None
    } else {
        Some(identity.id)
    };
    let page = Page {
        offset: req.page.offset()?,
        limit: req.page.limit()?,
        ascending: req.page.ascending,
    };
    let threshold = last_month_threshold(Local::now());

    let resp = sc.db.with_transaction(|tx| {
        let comments = tx.list_comments(author, page)?;
        let total_comments = tx.count_comments(author, None)?;
        let last_month_comments = match threshold {
            Some(threshold) => tx.count_comments(author, Some(threshold))?,
            None => 0,
        };
        Ok(CommentsResponse {
            comments,
            total_comments,
            last_month_comments,
        })
    })?;

    Ok(Response::with_data(resp))
}

fn get_comment(tx: &dyn Transaction, id: u64) -> anyhow::Result<Comment> {
    match tx.get_comment(id)? {
        Some(comment) => Ok(comment),
        None => Err(Error::NotFound("comment").into()),
    }
}
