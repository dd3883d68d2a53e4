use anyhow::Result;
use log::debug;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};

use crate::authz::Role;
use crate::db::sql::{convert_values, Select, Update, Value};
use crate::db::types::{CreateUserParams, Page, PatchUserParams, UserPassword};
use crate::types::user::User;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    salt TEXT NOT NULL,
    role TEXT NOT NULL,
    profile_picture TEXT DEFAULT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_user_created_at ON user(created_at);
"#;

const USER_FIELDS: &str = "id, username, email, role, profile_picture, created_at, updated_at";

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, params: CreateUserParams) -> Result<u64> {
    let sql = r#"
    INSERT INTO user (username, email, password, salt, role, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    "#;
    debug!(
        "Database create_user: {sql}, {}, {}, {}",
        params.username, params.email, params.role
    );
    tx.execute(
        sql,
        params![
            params.username,
            params.email,
            params.password,
            params.salt,
            params.role.as_str(),
            params.now,
            params.now,
        ],
    )?;

    Ok(tx.last_insert_rowid() as u64)
}

pub fn get(tx: &Transaction, id: u64) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_FIELDS} FROM user WHERE id = ?");
    debug!("Database get_user: {sql}, {id}");
    let user = tx
        .query_row(&sql, params![id], parse_row)
        .optional()?;
    Ok(user)
}

pub fn get_password(tx: &Transaction, email: &str) -> Result<Option<UserPassword>> {
    let sql = "SELECT id, password, salt FROM user WHERE email = ?";
    debug!("Database get_user_password: {sql}, {email}");
    let up = tx
        .query_row(sql, params![email], |row| {
            Ok(UserPassword {
                id: row.get(0)?,
                password: row.get(1)?,
                salt: row.get(2)?,
            })
        })
        .optional()?;
    Ok(up)
}

pub fn has_conflict(
    tx: &Transaction,
    username: Option<&str>,
    email: Option<&str>,
    exclude_id: Option<u64>,
) -> Result<bool> {
    let mut select = Select::count("user");
    match (username, email) {
        (Some(username), Some(email)) => {
            select.add_where_values(
                "(username = ? OR email = ?)",
                vec![
                    Value::Text(username.to_string()),
                    Value::Text(email.to_string()),
                ],
            );
        }
        (Some(username), None) => {
            select.add_where("username = ?", Value::Text(username.to_string()));
        }
        (None, Some(email)) => {
            select.add_where("email = ?", Value::Text(email.to_string()));
        }
        (None, None) => return Ok(false),
    }
    if let Some(id) = exclude_id {
        select.add_where("id != ?", Value::Integer(id as i64));
    }

    let (sql, values) = select.build();
    let values = convert_values(values);

    debug!("Database has_user_conflict: {sql}, {values:?}");
    let count: i64 = tx.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
    Ok(count > 0)
}

pub fn update(tx: &Transaction, params: PatchUserParams) -> Result<()> {
    let PatchUserParams {
        id,
        patch,
        salt,
        updated_at,
    } = params;
    let mut update = Update::new("user");

    if let Some(username) = patch.username {
        update.add_field("username", Value::Text(username));
    }
    if let Some(email) = patch.email {
        update.add_field("email", Value::Text(email));
    }
    if let Some(password) = patch.password {
        update.add_field("password", Value::Text(password));
    }
    if let Some(salt) = salt {
        update.add_field("salt", Value::Text(salt));
    }
    if let Some(profile_picture) = patch.profile_picture {
        update.add_field("profile_picture", Value::Text(profile_picture));
    }

    update.add_field("updated_at", Value::Integer(updated_at));
    update.add_where("id = ?", Value::Integer(id as i64));

    let (sql, values) = update.build();
    let values = convert_values(values);

    // Values may hold the password hash
    debug!("Database update_user: {sql}, id {id}");
    tx.execute(&sql, params_from_iter(values.iter()))?;

    Ok(())
}

pub fn delete(tx: &Transaction, id: u64) -> Result<bool> {
    let sql = "DELETE FROM user WHERE id = ?";
    debug!("Database delete_user: {sql}, {id}");
    let affected = tx.execute(sql, params![id])?;
    Ok(affected > 0)
}

pub fn count(tx: &Transaction, created_after: Option<i64>) -> Result<u64> {
    let mut select = Select::count("user");
    if let Some(created_after) = created_after {
        select.add_where("created_at >= ?", Value::Integer(created_after));
    }

    let (sql, values) = select.build();
    let values = convert_values(values);
    debug!("Database count_users: {sql}, {values:?}");

    let count: i64 = tx.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
    Ok(count as u64)
}

pub fn list(tx: &Transaction, page: Page) -> Result<Vec<User>> {
    let mut select = Select::new(USER_FIELDS, "user");
    select.add_order_by(if page.ascending {
        "created_at ASC"
    } else {
        "created_at DESC"
    });
    select.add_order_by("id ASC");
    select.set_page(page.offset, page.limit);

    let (sql, values) = select.build();
    let values = convert_values(values);
    debug!("Database list_users: {sql}, {values:?}");

    let mut stmt = tx.prepare(&sql)?;
    let users = stmt
        .query_map(params_from_iter(values.iter()), parse_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(users)
}

fn parse_row(row: &Row) -> rusqlite::Result<User> {
    let role: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role: Role::from(role),
        profile_picture: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
