mod sqlite;

#[cfg(test)]
mod tests;

pub mod config;
pub mod query;
pub mod sql;
pub mod types;

use std::cell::RefCell;
use std::sync::Mutex;

use anyhow::{bail, Result};
use sqlite::{SqliteConnection, SqliteTransaction};
use types::{
    Connection, CreateCommentParams, CreatePostParams, CreateResumeParams, CreateUserParams, Page,
    PatchPostParams, PatchUserParams, Transaction, UserPassword,
};

use crate::types::comment::Comment;
use crate::types::post::Post;
use crate::types::resume::Resume;
use crate::types::user::User;

use query::{CountQuery, PostQuery};

pub struct Database {
    conn: Mutex<RefCell<UnionConnection>>,
}

impl Database {
    pub fn new(conn: UnionConnection) -> Self {
        Self {
            conn: Mutex::new(RefCell::new(conn)),
        }
    }

    /// An empty in-memory database, for tests.
    pub fn memory() -> Result<Self> {
        let conn = SqliteConnection::memory()?;
        Ok(Self::new(UnionConnection::Sqlite(conn)))
    }

    /// Runs `f` in a transaction that commits when `f` succeeds and rolls
    /// back when it fails.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Transaction) -> Result<T>,
    {
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(e) => bail!("failed to lock connection: {:#}", e),
        };
        let mut conn = conn.borrow_mut();
        let tx = conn.transaction()?;

        let result = f(&tx);

        if result.is_ok() {
            tx.commit()
        } else {
            tx.rollback()
        }?;

        result
    }
}

pub enum UnionConnection {
    Sqlite(SqliteConnection),
}

pub enum UnionTransaction<'a> {
    Sqlite(SqliteTransaction<'a>),
}

impl<'a> Connection<'a, UnionTransaction<'a>> for UnionConnection {
    fn transaction(&'a mut self) -> Result<UnionTransaction<'a>> {
        match self {
            UnionConnection::Sqlite(conn) => conn.transaction().map(UnionTransaction::Sqlite),
        }
    }
}

impl Transaction for UnionTransaction<'_> {
    fn create_user(&self, params: CreateUserParams) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_user(params),
        }
    }

    fn get_user(&self, id: u64) -> Result<Option<User>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_user(id),
        }
    }

    fn get_user_password(&self, email: &str) -> Result<Option<UserPassword>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_user_password(email),
        }
    }

    fn has_user_conflict(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<u64>,
    ) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.has_user_conflict(username, email, exclude_id),
        }
    }

    fn update_user(&self, params: PatchUserParams) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.update_user(params),
        }
    }

    fn delete_user(&self, id: u64) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_user(id),
        }
    }

    fn count_users(&self, created_after: Option<i64>) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.count_users(created_after),
        }
    }

    fn list_users(&self, page: Page) -> Result<Vec<User>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_users(page),
        }
    }

    fn create_post(&self, params: CreatePostParams) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_post(params),
        }
    }

    fn has_post_conflict(
        &self,
        title: &str,
        slug: &str,
        exclude_id: Option<u64>,
    ) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.has_post_conflict(title, slug, exclude_id),
        }
    }

    fn get_post(&self, id: u64) -> Result<Option<Post>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_post(id),
        }
    }

    fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_posts(query),
        }
    }

    fn count_posts(&self, query: &CountQuery) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.count_posts(query),
        }
    }

    fn update_post(&self, params: PatchPostParams) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.update_post(params),
        }
    }

    fn delete_post(&self, id: u64) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_post(id),
        }
    }

    fn create_comment(&self, params: CreateCommentParams) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_comment(params),
        }
    }

    fn get_comment(&self, id: u64) -> Result<Option<Comment>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_comment(id),
        }
    }

    fn list_post_comments(&self, post_id: u64) -> Result<Vec<Comment>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_post_comments(post_id),
        }
    }

    fn list_comments(&self, author: Option<u64>, page: Page) -> Result<Vec<Comment>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_comments(author, page),
        }
    }

    fn count_comments(&self, author: Option<u64>, created_after: Option<i64>) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.count_comments(author, created_after),
        }
    }

    fn update_comment_content(&self, id: u64, content: &str, updated_at: i64) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.update_comment_content(id, content, updated_at),
        }
    }

    fn update_comment_likes(&self, id: u64, likes: &[u64]) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.update_comment_likes(id, likes),
        }
    }

    fn delete_comment(&self, id: u64) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_comment(id),
        }
    }

    fn delete_post_comments(&self, post_id: u64) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_post_comments(post_id),
        }
    }

    fn create_resume(&self, params: CreateResumeParams) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_resume(params),
        }
    }

    fn list_user_resumes(&self, user_id: u64) -> Result<Vec<Resume>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_user_resumes(user_id),
        }
    }

    fn commit(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.commit(),
        }
    }

    fn rollback(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.rollback(),
        }
    }
}
