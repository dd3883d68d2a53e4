use anyhow::Result;
use serde_json::Value as JsonValue;

use crate::authz::Role;
use crate::types::comment::Comment;
use crate::types::post::{Post, PostPatch};
use crate::types::resume::Resume;
use crate::types::user::{User, UserPatch};

use super::query::{CountQuery, PostQuery};

pub trait Connection<'a, T>
where
    T: Transaction + 'a,
{
    fn transaction(&'a mut self) -> Result<T>;
}

pub trait Transaction {
    fn create_user(&self, params: CreateUserParams) -> Result<u64>;
    fn get_user(&self, id: u64) -> Result<Option<User>>;
    fn get_user_password(&self, email: &str) -> Result<Option<UserPassword>>;
    /// Whether another user already holds `username` or `email`.
    fn has_user_conflict(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<u64>,
    ) -> Result<bool>;
    fn update_user(&self, params: PatchUserParams) -> Result<()>;
    fn delete_user(&self, id: u64) -> Result<bool>;
    fn count_users(&self, created_after: Option<i64>) -> Result<u64>;
    fn list_users(&self, page: Page) -> Result<Vec<User>>;

    fn create_post(&self, params: CreatePostParams) -> Result<u64>;
    /// Whether another post already uses `title` or `slug`.
    fn has_post_conflict(&self, title: &str, slug: &str, exclude_id: Option<u64>)
        -> Result<bool>;
    fn get_post(&self, id: u64) -> Result<Option<Post>>;
    fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>>;
    fn count_posts(&self, query: &CountQuery) -> Result<u64>;
    fn update_post(&self, params: PatchPostParams) -> Result<()>;
    fn delete_post(&self, id: u64) -> Result<bool>;

    fn create_comment(&self, params: CreateCommentParams) -> Result<u64>;
    fn get_comment(&self, id: u64) -> Result<Option<Comment>>;
    fn list_post_comments(&self, post_id: u64) -> Result<Vec<Comment>>;
    /// All comments when `author` is `None`, otherwise the author's own.
    fn list_comments(&self, author: Option<u64>, page: Page) -> Result<Vec<Comment>>;
    fn count_comments(&self, author: Option<u64>, created_after: Option<i64>) -> Result<u64>;
    fn update_comment_content(&self, id: u64, content: &str, updated_at: i64) -> Result<()>;
    fn update_comment_likes(&self, id: u64, likes: &[u64]) -> Result<()>;
    fn delete_comment(&self, id: u64) -> Result<bool>;
    fn delete_post_comments(&self, post_id: u64) -> Result<u64>;

    fn create_resume(&self, params: CreateResumeParams) -> Result<u64>;
    fn list_user_resumes(&self, user_id: u64) -> Result<Vec<Resume>>;

    fn commit(self) -> Result<()>;
    fn rollback(self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
    pub ascending: bool,
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub email: String,
    /// Already hashed with `salt`.
    pub password: String,
    pub salt: String,
    pub role: Role,
    pub now: i64,
}

#[derive(Debug, Default, PartialEq)]
pub struct UserPassword {
    pub id: u64,
    pub password: String,
    pub salt: String,
}

#[derive(Debug, Default)]
pub struct PatchUserParams {
    pub id: u64,
    /// A present password must already be hashed with `salt`.
    pub patch: UserPatch,
    pub salt: Option<String>,
    pub updated_at: i64,
}

#[derive(Debug, Default)]
pub struct CreatePostParams {
    pub user_id: u64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: String,
    pub subtitle: Option<String>,
    pub cover_image: Option<String>,
    pub now: i64,
}

#[derive(Debug, Default)]
pub struct PatchPostParams {
    pub id: u64,
    pub patch: PostPatch,
    /// Regenerated whenever the title changes.
    pub slug: Option<String>,
    pub updated_at: i64,
}

#[derive(Debug, Default)]
pub struct CreateCommentParams {
    pub content: String,
    pub post_id: u64,
    pub user_id: u64,
    pub now: i64,
}

#[derive(Debug, Default)]
pub struct CreateResumeParams {
    pub user_id: u64,
    pub layers: JsonValue,
    pub colors: JsonValue,
    pub now: i64,
}
