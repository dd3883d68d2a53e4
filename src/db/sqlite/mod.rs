mod comment;
mod post;
mod resume;
mod user;

pub mod config;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection as RawConnection;
use rusqlite::Transaction as RawTransaction;

use crate::db::query::{CountQuery, PostQuery};
use crate::db::types::{
    Connection, CreateCommentParams, CreatePostParams, CreateResumeParams, CreateUserParams, Page,
    PatchPostParams, PatchUserParams, Transaction, UserPassword,
};
use crate::types::comment::Comment;
use crate::types::post::Post;
use crate::types::resume::Resume;
use crate::types::user::User;

/// SQLite backend. A single connection serves the whole server; see
/// [`crate::db::Database`] for how access is serialized.
pub struct SqliteConnection {
    conn: RawConnection,
}

pub struct SqliteTransaction<'a> {
    tx: RawTransaction<'a>,
}

impl SqliteConnection {
    /// Opens a database file, creating it and its tables if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = RawConnection::open(path)?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    pub fn memory() -> Result<Self> {
        let conn = RawConnection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    fn init(conn: &RawConnection) -> Result<()> {
        register_functions(conn).context("register sqlite functions")?;
        user::create_table(conn)?;
        post::create_table(conn)?;
        comment::create_table(conn)?;
        resume::create_table(conn)?;
        Ok(())
    }
}

/// Name of the scalar function that lowercases with full Unicode case
/// mapping. The builtin `lower` and `LIKE` only fold ASCII letters.
pub const UNICODE_LOWER: &str = "unicode_lower";

fn register_functions(conn: &RawConnection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|s| s.to_lowercase()))
        },
    )
}

impl<'a> Connection<'a, SqliteTransaction<'a>> for SqliteConnection {
    fn transaction(&'a mut self) -> Result<SqliteTransaction<'a>> {
        let tx = self.conn.transaction()?;
        Ok(SqliteTransaction { tx })
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn create_user(&self, params: CreateUserParams) -> Result<u64> {
        user::create(&self.tx, params)
    }

    fn get_user(&self, id: u64) -> Result<Option<User>> {
        user::get(&self.tx, id)
    }

    fn get_user_password(&self, email: &str) -> Result<Option<UserPassword>> {
        user::get_password(&self.tx, email)
    }

    fn has_user_conflict(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<u64>,
    ) -> Result<bool> {
        user::has_conflict(&self.tx, username, email, exclude_id)
    }

    fn update_user(&self, params: PatchUserParams) -> Result<()> {
        user::update(&self.tx, params)
    }

    fn delete_user(&self, id: u64) -> Result<bool> {
        user::delete(&self.tx, id)
    }

    fn count_users(&self, created_after: Option<i64>) -> Result<u64> {
        user::count(&self.tx, created_after)
    }

    fn list_users(&self, page: Page) -> Result<Vec<User>> {
        user::list(&self.tx, page)
    }

    fn create_post(&self, params: CreatePostParams) -> Result<u64> {
        post::create(&self.tx, params)
    }

    fn has_post_conflict(
        &self,
        title: &str,
        slug: &str,
        exclude_id: Option<u64>,
    ) -> Result<bool> {
        post::has_conflict(&self.tx, title, slug, exclude_id)
    }

    fn get_post(&self, id: u64) -> Result<Option<Post>> {
        post::get(&self.tx, id)
    }

    fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>> {
        post::list(&self.tx, query)
    }

    fn count_posts(&self, query: &CountQuery) -> Result<u64> {
        post::count(&self.tx, query)
    }

    fn update_post(&self, params: PatchPostParams) -> Result<()> {
        post::update(&self.tx, params)
    }

    fn delete_post(&self, id: u64) -> Result<bool> {
        post::delete(&self.tx, id)
    }

    fn create_comment(&self, params: CreateCommentParams) -> Result<u64> {
        comment::create(&self.tx, params)
    }

    fn get_comment(&self, id: u64) -> Result<Option<Comment>> {
        comment::get(&self.tx, id)
    }

    fn list_post_comments(&self, post_id: u64) -> Result<Vec<Comment>> {
        comment::list_by_post(&self.tx, post_id)
    }

    fn list_comments(&self, author: Option<u64>, page: Page) -> Result<Vec<Comment>> {
        comment::list(&self.tx, author, page)
    }

    fn count_comments(&self, author: Option<u64>, created_after: Option<i64>) -> Result<u64> {
        comment::count(&self.tx, author, created_after)
    }

    fn update_comment_content(&self, id: u64, content: &str, updated_at: i64) -> Result<()> {
        comment::update_content(&self.tx, id, content, updated_at)
    }

    fn update_comment_likes(&self, id: u64, likes: &[u64]) -> Result<()> {
        comment::update_likes(&self.tx, id, likes)
    }

    fn delete_comment(&self, id: u64) -> Result<bool> {
        comment::delete(&self.tx, id)
    }

    fn delete_post_comments(&self, post_id: u64) -> Result<u64> {
        comment::delete_by_post(&self.tx, post_id)
    }

    fn create_resume(&self, params: CreateResumeParams) -> Result<u64> {
        resume::create(&self.tx, params)
    }

    fn list_user_resumes(&self, user_id: u64) -> Result<Vec<Resume>> {
        resume::list_by_user(&self.tx, user_id)
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}
