mod admin;
mod anonymous;
mod category;
mod chain;
mod owner;
mod union;

pub mod policy;

use std::collections::BTreeSet;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub use policy::AuthorizationPolicy;

/// Role attached to an authenticated identity.
///
/// Parsing never fails: any string outside the known roles becomes
/// [`Role::Unknown`], which has no category rights and is never treated as
/// admin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Contributor,
    VerifiedUser,
    User,
    Unknown(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Contributor => "contributor",
            Self::VerifiedUser => "verifieduser",
            Self::User => "user",
            Self::Unknown(s) => s.as_str(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            "contributor" => Self::Contributor,
            "verifieduser" => Self::VerifiedUser,
            "user" => Self::User,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Content category a post is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tutorials,
    Blogs,
    Resume,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tutorials" => Some(Self::Tutorials),
            "blogs" => Some(Self::Blogs),
            "resume" => Some(Self::Resume),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tutorials => "tutorials",
            Self::Blogs => "blogs",
            Self::Resume => "resume",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Categories each role may author into. Fixed for the lifetime of the process.
pub fn permitted_categories(role: &Role) -> &'static [Category] {
    match role {
        Role::Admin | Role::Contributor => &[Category::Tutorials, Category::Blogs, Category::Resume],
        Role::VerifiedUser => &[Category::Blogs, Category::Resume],
        Role::User => &[Category::Resume],
        Role::Unknown(_) => &[],
    }
}

pub type CategorySet = BTreeSet<Category>;

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: u64,
    pub role: Role,
}

/// Anything with a single author that may be modified by that author or an admin.
pub trait Owned {
    fn author_id(&self) -> u64;
}

/// Authorizers answer one question about one actor.
pub trait Authorizer: Send + Sync {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse;
}

#[derive(Debug, Clone, Copy)]
pub struct AuthzRequest<'a> {
    /// `None` when the caller has no verified identity.
    pub role: Option<&'a Role>,
    pub user_id: Option<u64>,
    pub action: Action<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    /// Create content in a category, given as the raw requested name.
    Create { category: &'a str },
    /// Modify or delete a resource written by `author_id`.
    Modify { author_id: u64 },
    ListUsers,
}

/// Possible responses from an authorization check.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthzResponse {
    Ok,
    /// Defers to the next authorizer in the chain
    Continue,
    Unauthorized,
}
