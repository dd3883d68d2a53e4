use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::authz::Owned;

use super::user::{check_id, require_id};
use super::{parse_json, PageRequest, Request};

pub const MAX_CONTENT_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub content: String,
    pub post_id: u64,
    pub user_id: u64,
    /// Ids of users who liked this comment.
    pub likes: Vec<u64>,
    pub number_of_likes: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Owned for Comment {
    fn author_id(&self) -> u64 {
        self.user_id
    }
}

impl Comment {
    /// Adds `user_id` to the likes, or removes it if already present.
    pub fn toggle_like(&mut self, user_id: u64) {
        match self.likes.iter().position(|id| *id == user_id) {
            Some(idx) => {
                self.likes.remove(idx);
            }
            None => self.likes.push(user_id),
        }
        self.number_of_likes = self.likes.len() as u64;
    }
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        bail!("Comment content is required");
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        bail!("Comment content must not exceed {MAX_CONTENT_LENGTH} characters");
    }
    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: String,
    #[serde(rename = "postId", default)]
    pub post_id: u64,
    #[serde(rename = "userId", default)]
    pub user_id: u64,
}

impl Request for CreateCommentRequest {
    fn is_data(&self) -> bool {
        true
    }

    fn complete_data(&mut self, data: &[u8]) -> Result<()> {
        *self = parse_json(data, "comment")?;
        validate_content(&self.content)?;
        if self.post_id == 0 {
            bail!("postId is required");
        }
        check_id("postId", self.post_id)?;
        check_id("userId", self.user_id)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PostCommentsRequest {
    pub post_id: u64,
}

impl Request for PostCommentsRequest {
    fn complete(&mut self, fields: HashMap<String, String>) -> Result<()> {
        self.post_id = require_id(&fields, "postId")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CommentIdRequest {
    pub comment_id: u64,
}

impl Request for CommentIdRequest {
    fn complete(&mut self, fields: HashMap<String, String>) -> Result<()> {
        self.comment_id = require_id(&fields, "commentId")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
struct CommentBody {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EditCommentRequest {
    pub comment_id: u64,
    pub content: String,
}

impl Request for EditCommentRequest {
    fn complete(&mut self, fields: HashMap<String, String>) -> Result<()> {
        self.comment_id = require_id(&fields, "commentId")?;
        Ok(())
    }

    fn is_data(&self) -> bool {
        true
    }

    fn complete_data(&mut self, data: &[u8]) -> Result<()> {
        let body: CommentBody = parse_json(data, "comment")?;
        validate_content(&body.content)?;
        self.content = body.content;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GetCommentsRequest {
    pub page: PageRequest,
}

impl Request for GetCommentsRequest {
    fn complete(&mut self, fields: HashMap<String, String>) -> Result<()> {
        self.page = PageRequest::parse(&fields, "sort")?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
    #[serde(rename = "totalComments")]
    pub total_comments: u64,
    #[serde(rename = "lastMonthComments")]
    pub last_month_comments: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment() -> Comment {
        Comment {
            id: 1,
            content: String::from("nice"),
            post_id: 2,
            user_id: 3,
            likes: vec![],
            number_of_likes: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_toggle_like() {
        let mut c = comment();
        c.toggle_like(7);
        c.toggle_like(8);
        assert_eq!(c.likes, vec![7, 8]);
        assert_eq!(c.number_of_likes, 2);

        c.toggle_like(7);
        assert_eq!(c.likes, vec![8]);
        assert_eq!(c.number_of_likes, 1);

        c.toggle_like(8);
        assert!(c.likes.is_empty());
        assert_eq!(c.number_of_likes, 0);
    }

    #[test]
    fn test_content_length() {
        let mut req = EditCommentRequest::default();
        let ok = format!(r#"{{"content":"{}"}}"#, "a".repeat(MAX_CONTENT_LENGTH));
        req.complete_data(ok.as_bytes()).unwrap();

        let too_long = format!(r#"{{"content":"{}"}}"#, "a".repeat(MAX_CONTENT_LENGTH + 1));
        assert!(req.complete_data(too_long.as_bytes()).is_err());
        assert!(req.complete_data(br#"{"content":"   "}"#).is_err());
    }

    #[test]
    fn test_create_comment_request() {
        let mut req = CreateCommentRequest::default();
        req.complete_data(br#"{"content":"hello","postId":4,"userId":2}"#)
            .unwrap();
        assert_eq!(req.post_id, 4);
        assert_eq!(req.user_id, 2);

        assert!(req
            .complete_data(br#"{"content":"hello","userId":2}"#)
            .is_err());
    }
}
