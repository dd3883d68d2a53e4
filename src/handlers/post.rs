use log::debug;

use crate::auth::require_identity;
use crate::authz::{Category, Identity};
use crate::context::ServerContext;
use crate::db::query::{PostQuery, PostQueryBuilder};
use crate::db::types::{CreatePostParams, PatchPostParams, Transaction};
use crate::error::{Error, Result};
use crate::register_handlers;
use crate::time::current_timestamp;
use crate::types::post::{
    generate_slug, CreatePostRequest, CreatePostResponse, DeletePostRequest, GetPostsRequest,
    GetUserPostsRequest, Post, PostsResponse, UpdatePostRequest,
};
use crate::types::Response;

register_handlers!(create_post, get_posts, get_user_posts, update_post, delete_post);

async fn create_post(
    req: CreatePostRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<CreatePostResponse>> {
    let identity = require_identity(identity)?;
    check_category(sc, &identity, &req.category)?;

    let slug = generate_slug(&req.title);
    debug!("User {} creates post {slug} in {}", identity.id, req.category);

    let id = sc.db.with_transaction(|tx| {
        if tx.has_post_conflict(&req.title, &slug, None)? {
            return Err(Error::conflict("A post with this title already exists").into());
        }
        tx.create_post(CreatePostParams {
            user_id: identity.id,
            title: req.title,
            slug: slug.clone(),
            content: req.content,
            category: req.category,
            subtitle: req.subtitle,
            cover_image: req.cover_image,
            now: current_timestamp(),
        })
    })?;

    Ok(Response::created(
        "Post created successfully",
        CreatePostResponse { id, slug },
    ))
}

async fn get_posts(
    req: GetPostsRequest,
    _identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<PostsResponse>> {
    let query = PostQueryBuilder::new().build(&req.filter, None)?;
    list_posts(sc, query)
}

async fn get_user_posts(
    req: GetUserPostsRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<PostsResponse>> {
    let identity = require_identity(identity)?;

    let allowed = sc.policy.allowed_categories_for(&identity.role);
    if allowed.is_empty() {
        return Err(Error::denied("You are not allowed to view posts"));
    }

    let mut filter = req.filter;
    filter.author_id = Some(identity.id);
    let query = PostQueryBuilder::new().build(&filter, Some(&allowed))?;
    list_posts(sc, query)
}

async fn update_post(
    req: UpdatePostRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<Post>> {
    let identity = require_identity(identity)?;
    if let Some(ref category) = req.patch.category {
        check_category(sc, &identity, category)?;
    }

    let slug = req.patch.title.as_deref().map(generate_slug);

    let post = sc.db.with_transaction(|tx| {
        let post = get_owned_post(sc, tx, &identity, req.post_id, req.user_id)?;

        if let (Some(title), Some(slug)) = (req.patch.title.as_deref(), slug.as_deref()) {
            if tx.has_post_conflict(title, slug, Some(post.id))? {
                return Err(Error::conflict("A post with this title already exists").into());
            }
        }

        debug!("User {} updates post {}", identity.id, post.id);
        tx.update_post(PatchPostParams {
            id: post.id,
            patch: req.patch,
            slug,
            updated_at: current_timestamp(),
        })?;
        tx.get_post(post.id)?
            .ok_or_else(|| Error::NotFound("post").into())
    })?;

    Ok(Response::with_data(post))
}

async fn delete_post(
    req: DeletePostRequest,
    identity: Option<Identity>,
    sc: &ServerContext,
) -> Result<Response<()>> {
    let identity = require_identity(identity)?;

    sc.db.with_transaction(|tx| {
        let post = get_owned_post(sc, tx, &identity, req.post_id, req.user_id)?;
        tx.delete_post(post.id)?;
        let comments = tx.delete_post_comments(post.id)?;
        debug!(
            "User {} deleted post {} with {comments} comments",
            identity.id, post.id
        );
        Ok(())
    })?;

    Ok(Response::with_message("The post has been deleted"))
}

fn list_posts(sc: &ServerContext, query: PostQuery) -> Result<Response<PostsResponse>> {
    let resp = sc.db.with_transaction(|tx| {
        let posts = tx.list_posts(&query)?;
        let total_posts = tx.count_posts(&query.total)?;
        let last_month_posts = tx.count_posts(&query.last_month)?;
        Ok(PostsResponse {
            posts,
            total_posts,
            last_month_posts,
        })
    })?;
    Ok(Response::with_data(resp))
}

/// Unknown categories are malformed input; known ones outside the role's
/// rights are denied.
fn check_category(sc: &ServerContext, identity: &Identity, category: &str) -> Result<()> {
    if Category::parse(category).is_none() {
        return Err(Error::validation(format!("Invalid category '{category}'")));
    }
    if !sc.policy.can_create_in_category(&identity.role, category) {
        return Err(Error::denied(format!(
            "You are not allowed to post in '{category}'"
        )));
    }
    Ok(())
}

/// Loads the post addressed by `{postId}/{userId}` and checks that the caller
/// may modify it.
fn get_owned_post(
    sc: &ServerContext,
    tx: &dyn Transaction,
    identity: &Identity,
    post_id: u64,
    user_id: u64,
) -> anyhow::Result<Post> {
    let post = match tx.get_post(post_id)? {
        Some(post) if post.user_id == user_id => post,
        _ => return Err(Error::NotFound("post").into()),
    };
    if !sc.policy.can_modify_post(Some(identity), &post) {
        return Err(Error::denied("You are not allowed to modify this post").into());
    }
    Ok(post)
}
