use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::authz::Owned;
use crate::db::query::{PostFilter, SortDirection};
use crate::parse_from_map;

use super::user::{parse_id, require_id};
use super::{parse_json, Request};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: String,
    pub subtitle: Option<String>,
    pub cover_image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Owned for Post {
    fn author_id(&self) -> u64 {
        self.user_id
    }
}

/// Lowercased title with spaces turned into dashes and everything outside
/// `[a-z0-9-]` dropped.
pub fn generate_slug(title: &str) -> String {
    title
        .split(' ')
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    pub subtitle: Option<String>,
    pub cover_image: Option<String>,
}

impl Request for CreatePostRequest {
    fn is_data(&self) -> bool {
        true
    }

    fn complete_data(&mut self, data: &[u8]) -> Result<()> {
        *self = parse_json(data, "post")?;
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            bail!("Please provide all required fields");
        }
        if generate_slug(&self.title).is_empty() {
            bail!("Title must contain at least one letter or digit");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePostResponse {
    pub id: u64,
    pub slug: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GetPostsRequest {
    pub filter: PostFilter,
}

impl Request for GetPostsRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.filter = PostFilter {
            author_id: parse_id(&fields, "userId")?,
            category: take_text(&mut fields, "category"),
            slug: take_text(&mut fields, "slug"),
            post_id: parse_id(&fields, "postId")?,
            search_term: take_text(&mut fields, "searchTerm"),
            start_index: parse_from_map!(fields, "startIndex"),
            limit: parse_from_map!(fields, "limit"),
            sort: parse_sort(&fields)?,
        };
        Ok(())
    }
}

/// Listing of the caller's own posts. Only pagination and sort are taken
/// from the query; the author and category scope come from the identity.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GetUserPostsRequest {
    pub filter: PostFilter,
}

impl Request for GetUserPostsRequest {
    fn complete(&mut self, fields: HashMap<String, String>) -> Result<()> {
        self.filter = PostFilter {
            start_index: parse_from_map!(fields, "startIndex"),
            limit: parse_from_map!(fields, "limit"),
            sort: parse_sort(&fields)?,
            ..Default::default()
        };
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
    #[serde(rename = "totalPosts")]
    pub total_posts: u64,
    #[serde(rename = "lastMonthPosts")]
    pub last_month_posts: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub subtitle: Option<String>,
    pub cover_image: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdatePostRequest {
    pub post_id: u64,
    pub user_id: u64,
    pub patch: PostPatch,
}

impl Request for UpdatePostRequest {
    fn complete(&mut self, fields: HashMap<String, String>) -> Result<()> {
        self.post_id = require_id(&fields, "postId")?;
        self.user_id = require_id(&fields, "userId")?;
        Ok(())
    }

    fn is_data(&self) -> bool {
        true
    }

    fn complete_data(&mut self, data: &[u8]) -> Result<()> {
        self.patch = parse_json(data, "post")?;
        if let Some(ref title) = self.patch.title {
            if generate_slug(title).is_empty() {
                bail!("Title must contain at least one letter or digit");
            }
        }
        if let Some(ref content) = self.patch.content {
            if content.trim().is_empty() {
                bail!("Content cannot be empty");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DeletePostRequest {
    pub post_id: u64,
    pub user_id: u64,
}

impl Request for DeletePostRequest {
    fn complete(&mut self, fields: HashMap<String, String>) -> Result<()> {
        self.post_id = require_id(&fields, "postId")?;
        self.user_id = require_id(&fields, "userId")?;
        Ok(())
    }
}

fn take_text(fields: &mut HashMap<String, String>, name: &str) -> Option<String> {
    fields.remove(name).filter(|s| !s.is_empty())
}

fn parse_sort(fields: &HashMap<String, String>) -> Result<SortDirection> {
    match fields.get("order").map(|s| s.as_str()) {
        None | Some("") => Ok(SortDirection::default()),
        Some(s) => match SortDirection::parse(s) {
            Some(sort) => Ok(sort),
            None => bail!("order must be 'asc' or 'desc', found '{s}'"),
        },
    }
}
