use anyhow::{Context, Result};
use log::debug;
use rusqlite::{params, Connection, Transaction};

use crate::db::types::CreateResumeParams;
use crate::types::resume::Resume;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS resume (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    layers TEXT NOT NULL,
    colors TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_resume_user_id ON resume(user_id);
"#;

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, params: CreateResumeParams) -> Result<u64> {
    let layers = serde_json::to_string(&params.layers).context("encode resume layers")?;
    let colors = serde_json::to_string(&params.colors).context("encode resume colors")?;

    let sql = r#"
    INSERT INTO resume (user_id, layers, colors, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?)
    "#;
    debug!("Database create_resume: {sql}, user {}", params.user_id);
    tx.execute(
        sql,
        params![params.user_id, layers, colors, params.now, params.now],
    )?;

    Ok(tx.last_insert_rowid() as u64)
}

pub fn list_by_user(tx: &Transaction, user_id: u64) -> Result<Vec<Resume>> {
    let sql = r#"
    SELECT id, user_id, layers, colors, created_at, updated_at
    FROM resume WHERE user_id = ? ORDER BY created_at DESC, id DESC
    "#;
    debug!("Database list_user_resumes: {sql}, {user_id}");

    let mut stmt = tx.prepare(sql)?;
    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((
                row.get::<_, u64>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut resumes = Vec::with_capacity(rows.len());
    for (id, user_id, layers, colors, created_at, updated_at) in rows {
        resumes.push(Resume {
            id,
            user_id,
            layers: serde_json::from_str(&layers)
                .with_context(|| format!("decode layers of resume {id}"))?,
            colors: serde_json::from_str(&colors)
                .with_context(|| format!("decode colors of resume {id}"))?,
            created_at,
            updated_at,
        });
    }

    Ok(resumes)
}
