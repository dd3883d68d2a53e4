use thiserror::Error;

use crate::types;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced to API callers. Each variant maps to one HTTP status.
#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Denied(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("upstream failure: {0:#}")]
    Upstream(anyhow::Error),
}

impl Error {
    pub fn denied(reason: impl ToString) -> Self {
        Self::Denied(reason.to_string())
    }

    pub fn validation(reason: impl ToString) -> Self {
        Self::Validation(reason.to_string())
    }

    pub fn conflict(reason: impl ToString) -> Self {
        Self::Conflict(reason.to_string())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => types::STATUS_UNAUTHORIZED,
            Self::Denied(_) => types::STATUS_FORBIDDEN,
            Self::Validation(_) => types::STATUS_BAD_REQUEST,
            Self::NotFound(_) => types::STATUS_NOT_FOUND,
            Self::Conflict(_) => types::STATUS_CONFLICT,
            Self::Upstream(_) => types::STATUS_INTERNAL_SERVER_ERROR,
        }
    }
}

/// Database closures may return an [`Error`] through `anyhow`; it is recovered
/// here so that conflicts and missing rows keep their status code.
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<Error>() {
            Ok(err) => err,
            Err(err) => Self::Upstream(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_status_code() {
        assert_eq!(Error::Unauthenticated.status_code(), 401);
        assert_eq!(Error::denied("no").status_code(), 403);
        assert_eq!(Error::validation("bad").status_code(), 400);
        assert_eq!(Error::NotFound("post").status_code(), 404);
        assert_eq!(Error::conflict("dup").status_code(), 409);
        assert_eq!(Error::Upstream(anyhow!("db")).status_code(), 500);
    }

    #[test]
    fn test_from_anyhow() {
        let err: anyhow::Error = Error::NotFound("comment").into();
        let err = Error::from(err);
        assert!(matches!(err, Error::NotFound("comment")));
        assert_eq!(err.to_string(), "comment not found");

        let err = Error::from(anyhow!("disk I/O error"));
        assert!(matches!(err, Error::Upstream(_)));
    }
}
