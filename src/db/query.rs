use chrono::{DateTime, Local};

use crate::authz::CategorySet;
use crate::error::{Error, Result};
use crate::time;

use super::sql::Value;
use super::sqlite::UNICODE_LOWER;

/// Columns selected for a post, in the order rows are decoded.
pub const POST_FIELDS: &str =
    "id, user_id, title, slug, content, category, subtitle, cover_image, created_at, updated_at";

pub const DEFAULT_START_INDEX: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Validated listing parameters. Absent pagination fields take the defaults
/// when the query is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub author_id: Option<u64>,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub post_id: Option<u64>,
    pub search_term: Option<String>,
    pub start_index: Option<i64>,
    pub limit: Option<i64>,
    pub sort: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// A fully bound post listing: the page query plus the two aggregate counts
/// over the same filter.
#[derive(Debug, Clone, PartialEq)]
pub struct PostQuery {
    /// Filter predicates joined with `AND`; empty when there are none.
    pub predicate: String,
    /// Filter values followed by `start_index` and `limit`.
    pub params: Vec<Value>,
    pub sql: String,

    pub total: CountQuery,
    /// Rows created on or after one calendar month before now.
    pub last_month: CountQuery,
}

/// Turns a [`PostFilter`] into numbered-placeholder SQL (`?1`, `?2`, ...).
pub struct PostQueryBuilder {
    now: DateTime<Local>,
}

impl Default for PostQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PostQueryBuilder {
    pub fn new() -> Self {
        Self::with_now(Local::now())
    }

    pub fn with_now(now: DateTime<Local>) -> Self {
        Self { now }
    }

    /// `allowed` restricts the result to a set of categories. It is ANDed with
    /// an explicit category filter, so a category outside the set simply
    /// matches nothing.
    pub fn build(&self, filter: &PostFilter, allowed: Option<&CategorySet>) -> Result<PostQuery> {
        let start_index = filter.start_index.unwrap_or(DEFAULT_START_INDEX);
        if start_index < 0 {
            return Err(Error::validation("startIndex must not be negative"));
        }
        let limit = filter.limit.unwrap_or(DEFAULT_LIMIT);
        if limit <= 0 {
            return Err(Error::validation("limit must be greater than 0"));
        }

        let mut predicates: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(author_id) = filter.author_id {
            params.push(id_value("userId", author_id)?);
            predicates.push(format!("user_id = ?{}", params.len()));
        }

        if let Some(ref category) = filter.category {
            params.push(Value::Text(category.clone()));
            predicates.push(format!("category = ?{}", params.len()));
        }

        if let Some(ref slug) = filter.slug {
            params.push(Value::Text(slug.clone()));
            predicates.push(format!("slug = ?{}", params.len()));
        }

        if let Some(post_id) = filter.post_id {
            params.push(id_value("postId", post_id)?);
            predicates.push(format!("id = ?{}", params.len()));
        }

        if let Some(ref term) = filter.search_term {
            let pattern = format!("%{}%", term.to_lowercase());
            params.push(Value::Text(pattern.clone()));
            params.push(Value::Text(pattern));
            predicates.push(format!(
                "({UNICODE_LOWER}(title) LIKE ?{} OR {UNICODE_LOWER}(content) LIKE ?{})",
                params.len() - 1,
                params.len()
            ));
        }

        if let Some(allowed) = allowed {
            let names = allowed.iter().map(|c| c.as_str().to_string()).collect();
            params.push(Value::List(names));
            predicates.push(format!(
                "category IN (SELECT value FROM json_each(?{}))",
                params.len()
            ));
        }

        let predicate = predicates.join(" AND ");
        let where_clause = if predicate.is_empty() {
            String::new()
        } else {
            format!(" WHERE {predicate}")
        };

        let total = CountQuery {
            sql: format!("SELECT COUNT(1) FROM post{where_clause}"),
            params: params.clone(),
        };

        let threshold = match time::last_month_threshold(self.now) {
            Some(threshold) => threshold,
            None => {
                return Err(Error::Upstream(anyhow::anyhow!(
                    "current date {} is out of range",
                    self.now
                )))
            }
        };
        let mut last_month_params = params.clone();
        last_month_params.push(Value::Integer(threshold));
        let created_after = format!("created_at >= ?{}", last_month_params.len());
        let last_month_sql = if predicate.is_empty() {
            format!("SELECT COUNT(1) FROM post WHERE {created_after}")
        } else {
            format!("SELECT COUNT(1) FROM post WHERE {predicate} AND {created_after}")
        };
        let last_month = CountQuery {
            sql: last_month_sql,
            params: last_month_params,
        };

        params.push(Value::Integer(start_index));
        let offset_index = params.len();
        params.push(Value::Integer(limit));
        let limit_index = params.len();

        let sql = format!(
            "SELECT {POST_FIELDS} FROM post{where_clause} ORDER BY updated_at {}, id ASC LIMIT ?{limit_index} OFFSET ?{offset_index}",
            filter.sort.as_sql()
        );

        Ok(PostQuery {
            predicate,
            params,
            sql,
            total,
            last_month,
        })
    }
}

fn id_value(name: &str, id: u64) -> Result<Value> {
    match i64::try_from(id) {
        Ok(id) => Ok(Value::Integer(id)),
        Err(_) => Err(Error::validation(format!("{name} is out of range"))),
    }
}
