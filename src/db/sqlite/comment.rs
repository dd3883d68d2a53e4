use anyhow::{Context, Result};
use log::debug;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};

use crate::db::sql::{convert_values, Select, Value};
use crate::db::types::{CreateCommentParams, Page};
use crate::types::comment::Comment;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS comment (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    post_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    likes TEXT NOT NULL DEFAULT '[]',
    number_of_likes INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comment_post_id ON comment(post_id);
CREATE INDEX IF NOT EXISTS idx_comment_user_id ON comment(user_id);
"#;

const COMMENT_FIELDS: &str =
    "id, content, post_id, user_id, likes, number_of_likes, created_at, updated_at";

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, params: CreateCommentParams) -> Result<u64> {
    let sql = r#"
    INSERT INTO comment (content, post_id, user_id, likes, number_of_likes, created_at, updated_at)
    VALUES (?, ?, ?, '[]', 0, ?, ?)
    "#;
    debug!("Database create_comment: {sql}, {params:?}");
    tx.execute(
        sql,
        params![
            params.content,
            params.post_id,
            params.user_id,
            params.now,
            params.now,
        ],
    )?;

    Ok(tx.last_insert_rowid() as u64)
}

pub fn get(tx: &Transaction, id: u64) -> Result<Option<Comment>> {
    let sql = format!("SELECT {COMMENT_FIELDS} FROM comment WHERE id = ?");
    debug!("Database get_comment: {sql}, {id}");
    let row = tx.query_row(&sql, params![id], read_row).optional()?;
    row.map(CommentRow::into_comment).transpose()
}

pub fn list_by_post(tx: &Transaction, post_id: u64) -> Result<Vec<Comment>> {
    let mut select = Select::new(COMMENT_FIELDS, "comment");
    select.add_where("post_id = ?", Value::Integer(post_id as i64));
    select.add_order_by("created_at DESC");
    select.add_order_by("id DESC");
    query_comments(tx, "list_post_comments", select)
}

pub fn list(tx: &Transaction, author: Option<u64>, page: Page) -> Result<Vec<Comment>> {
    let mut select = Select::new(COMMENT_FIELDS, "comment");
    if let Some(author) = author {
        select.add_where("user_id = ?", Value::Integer(author as i64));
    }
    select.add_order_by(if page.ascending {
        "created_at ASC"
    } else {
        "created_at DESC"
    });
    select.add_order_by("id ASC");
    select.set_page(page.offset, page.limit);
    query_comments(tx, "list_comments", select)
}

pub fn count(tx: &Transaction, author: Option<u64>, created_after: Option<i64>) -> Result<u64> {
    let mut select = Select::count("comment");
    if let Some(author) = author {
        select.add_where("user_id = ?", Value::Integer(author as i64));
    }
    if let Some(created_after) = created_after {
        select.add_where("created_at >= ?", Value::Integer(created_after));
    }

    let (sql, values) = select.build();
    let values = convert_values(values);
    debug!("Database count_comments: {sql}, {values:?}");

    let count: i64 = tx.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
    Ok(count as u64)
}

pub fn update_content(tx: &Transaction, id: u64, content: &str, updated_at: i64) -> Result<()> {
    let sql = "UPDATE comment SET content = ?, updated_at = ? WHERE id = ?";
    debug!("Database update_comment_content: {sql}, {id}");
    tx.execute(sql, params![content, updated_at, id])?;
    Ok(())
}

/// Likes do not count as an edit, `updated_at` is left alone.
pub fn update_likes(tx: &Transaction, id: u64, likes: &[u64]) -> Result<()> {
    let encoded = serde_json::to_string(likes).context("encode comment likes")?;
    let sql = "UPDATE comment SET likes = ?, number_of_likes = ? WHERE id = ?";
    debug!("Database update_comment_likes: {sql}, {encoded}, {id}");
    tx.execute(sql, params![encoded, likes.len() as i64, id])?;
    Ok(())
}

pub fn delete(tx: &Transaction, id: u64) -> Result<bool> {
    let sql = "DELETE FROM comment WHERE id = ?";
    debug!("Database delete_comment: {sql}, {id}");
    let affected = tx.execute(sql, params![id])?;
    Ok(affected > 0)
}

pub fn delete_by_post(tx: &Transaction, post_id: u64) -> Result<u64> {
    let sql = "DELETE FROM comment WHERE post_id = ?";
    debug!("Database delete_post_comments: {sql}, {post_id}");
    let affected = tx.execute(sql, params![post_id])?;
    Ok(affected as u64)
}

fn query_comments(tx: &Transaction, name: &str, select: Select) -> Result<Vec<Comment>> {
    let (sql, values) = select.build();
    let values = convert_values(values);
    debug!("Database {name}: {sql}, {values:?}");

    let mut stmt = tx.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), read_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter().map(CommentRow::into_comment).collect()
}

/// Raw row; `likes` is stored as a JSON array and decoded afterwards.
struct CommentRow {
    id: u64,
    content: String,
    post_id: u64,
    user_id: u64,
    likes: String,
    number_of_likes: u64,
    created_at: i64,
    updated_at: i64,
}

impl CommentRow {
    fn into_comment(self) -> Result<Comment> {
        let likes: Vec<u64> = serde_json::from_str(&self.likes)
            .with_context(|| format!("decode likes of comment {}", self.id))?;
        Ok(Comment {
            id: self.id,
            content: self.content,
            post_id: self.post_id,
            user_id: self.user_id,
            likes,
            number_of_likes: self.number_of_likes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn read_row(row: &Row) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        content: row.get(1)?,
        post_id: row.get(2)?,
        user_id: row.get(3)?,
        likes: row.get(4)?,
        number_of_likes: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
