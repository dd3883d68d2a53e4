use anyhow::Result;
use log::debug;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};

use crate::db::query::{CountQuery, PostQuery, POST_FIELDS};
use crate::db::sql::{convert_values, Select, Update, Value};
use crate::db::types::{CreatePostParams, PatchPostParams};
use crate::types::post::Post;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS post (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL UNIQUE,
    slug TEXT NOT NULL UNIQUE,
    content TEXT NOT NULL,
    category TEXT NOT NULL,
    subtitle TEXT DEFAULT NULL,
    cover_image TEXT DEFAULT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_post_user_id ON post(user_id);
CREATE INDEX IF NOT EXISTS idx_post_category ON post(category);
CREATE INDEX IF NOT EXISTS idx_post_updated_at ON post(updated_at);
"#;

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, params: CreatePostParams) -> Result<u64> {
    let sql = r#"
    INSERT INTO post (user_id, title, slug, content, category, subtitle, cover_image, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    "#;
    debug!(
        "Database create_post: {sql}, {}, {}, {}",
        params.user_id, params.slug, params.category
    );
    tx.execute(
        sql,
        params![
            params.user_id,
            params.title,
            params.slug,
            params.content,
            params.category,
            params.subtitle,
            params.cover_image,
            params.now,
            params.now,
        ],
    )?;

    Ok(tx.last_insert_rowid() as u64)
}

pub fn has_conflict(
    tx: &Transaction,
    title: &str,
    slug: &str,
    exclude_id: Option<u64>,
) -> Result<bool> {
    let mut select = Select::count("post");
    select.add_where_values(
        "(title = ? OR slug = ?)",
        vec![Value::Text(title.to_string()), Value::Text(slug.to_string())],
    );
    if let Some(id) = exclude_id {
        select.add_where("id != ?", Value::Integer(id as i64));
    }

    let (sql, values) = select.build();
    let values = convert_values(values);
    debug!("Database has_post_conflict: {sql}, {values:?}");

    let count: i64 = tx.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
    Ok(count > 0)
}

pub fn get(tx: &Transaction, id: u64) -> Result<Option<Post>> {
    let sql = format!("SELECT {POST_FIELDS} FROM post WHERE id = ?");
    debug!("Database get_post: {sql}, {id}");
    let post = tx.query_row(&sql, params![id], parse_row).optional()?;
    Ok(post)
}

pub fn list(tx: &Transaction, query: &PostQuery) -> Result<Vec<Post>> {
    let values = convert_values(query.params.clone());
    debug!("Database list_posts: {}, {values:?}", query.sql);

    let mut stmt = tx.prepare(&query.sql)?;
    let posts = stmt
        .query_map(params_from_iter(values.iter()), parse_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(posts)
}

pub fn count(tx: &Transaction, query: &CountQuery) -> Result<u64> {
    let values = convert_values(query.params.clone());
    debug!("Database count_posts: {}, {values:?}", query.sql);

    let count: i64 = tx.query_row(&query.sql, params_from_iter(values.iter()), |row| {
        row.get(0)
    })?;
    Ok(count as u64)
}

pub fn update(tx: &Transaction, params: PatchPostParams) -> Result<()> {
    let PatchPostParams {
        id,
        patch,
        slug,
        updated_at,
    } = params;
    let mut update = Update::new("post");

    if let Some(title) = patch.title {
        update.add_field("title", Value::Text(title));
    }
    if let Some(slug) = slug {
        update.add_field("slug", Value::Text(slug));
    }
    if let Some(content) = patch.content {
        update.add_field("content", Value::Text(content));
    }
    if let Some(category) = patch.category {
        update.add_field("category", Value::Text(category));
    }
    if let Some(subtitle) = patch.subtitle {
        update.add_field("subtitle", Value::Text(subtitle));
    }
    if let Some(cover_image) = patch.cover_image {
        update.add_field("cover_image", Value::Text(cover_image));
    }

    update.add_field("updated_at", Value::Integer(updated_at));
    update.add_where("id = ?", Value::Integer(id as i64));

    let (sql, values) = update.build();
    let values = convert_values(values);

    debug!("Database update_post: {sql}, {values:?}");
    tx.execute(&sql, params_from_iter(values.iter()))?;

    Ok(())
}

pub fn delete(tx: &Transaction, id: u64) -> Result<bool> {
    let sql = "DELETE FROM post WHERE id = ?";
    debug!("Database delete_post: {sql}, {id}");
    let affected = tx.execute(sql, params![id])?;
    Ok(affected > 0)
}

fn parse_row(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        slug: row.get(3)?,
        content: row.get(4)?,
        category: row.get(5)?,
        subtitle: row.get(6)?,
        cover_image: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
