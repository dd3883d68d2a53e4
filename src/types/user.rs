use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::authz::Role;
use crate::parse_from_map;

use super::{parse_json, PageRequest, Request};

/// Public view of a user. Password hash and salt never leave the database layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub profile_picture: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Request for SignUpRequest {
    fn is_data(&self) -> bool {
        true
    }

    fn complete_data(&mut self, data: &[u8]) -> Result<()> {
        *self = parse_json(data, "sign-up")?;
        if self.username.is_empty() || self.email.is_empty() || self.password.is_empty() {
            bail!("All fields are required");
        }
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Request for SignInRequest {
    fn is_data(&self) -> bool {
        true
    }

    fn complete_data(&mut self, data: &[u8]) -> Result<()> {
        *self = parse_json(data, "sign-in")?;
        if self.email.is_empty() || self.password.is_empty() {
            bail!("All fields are required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    pub user: User,
    pub token: String,
    pub expire_after: i64,
}

/// Target user taken from the `{userId}` path segment.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserIdRequest {
    pub user_id: u64,
}

impl Request for UserIdRequest {
    fn complete(&mut self, fields: HashMap<String, String>) -> Result<()> {
        self.user_id = require_id(&fields, "userId")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GetUsersRequest {
    pub page: PageRequest,
}

impl Request for GetUsersRequest {
    fn complete(&mut self, fields: HashMap<String, String>) -> Result<()> {
        self.page = PageRequest::parse(&fields, "sort")?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
    #[serde(rename = "totalUsers")]
    pub total_users: u64,
    #[serde(rename = "lastMonthUsers")]
    pub last_month_users: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "profilePicture")]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateUserRequest {
    pub user_id: u64,
    pub patch: UserPatch,
}

impl Request for UpdateUserRequest {
    fn complete(&mut self, fields: HashMap<String, String>) -> Result<()> {
        self.user_id = require_id(&fields, "userId")?;
        Ok(())
    }

    fn is_data(&self) -> bool {
        true
    }

    fn complete_data(&mut self, data: &[u8]) -> Result<()> {
        self.patch = parse_json(data, "user")?;
        if let Some(ref password) = self.patch.password {
            validate_password(password)?;
        }
        if let Some(ref username) = self.patch.username {
            validate_username(username)?;
        }
        if let Some(ref email) = self.patch.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < 6 {
        bail!("Password must be at least 6 characters");
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(7..=20).contains(&len) {
        bail!("Username must be between 7 and 20 characters");
    }
    if username.contains(' ') {
        bail!("Username cannot contain spaces");
    }
    if username != username.to_lowercase() {
        bail!("Username must be lowercase");
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        bail!("Username can only contain letters and numbers");
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => bail!("Email '{email}' is invalid"),
    }
}

/// Reads a required numeric id from the path or query fields.
pub fn require_id(fields: &HashMap<String, String>, name: &str) -> Result<u64> {
    match parse_id(fields, name)? {
        Some(id) => Ok(id),
        None => bail!("{name} is required"),
    }
}

/// Reads an optional numeric id from the path or query fields.
pub fn parse_id(fields: &HashMap<String, String>, name: &str) -> Result<Option<u64>> {
    let id: Option<u64> = parse_from_map!(fields, name);
    id.map(|id| check_id(name, id)).transpose()
}

/// Row ids are SQLite integers, nothing above `i64::MAX` can exist.
pub fn check_id(name: &str, id: u64) -> Result<u64> {
    if i64::try_from(id).is_err() {
        bail!("{name} is out of range");
    }
    Ok(id)
}
