use crate::auth::jwt::{JwtTokenGenerator, JwtTokenValidator};
use crate::authz::AuthorizationPolicy;
use crate::config::server::ServerConfig;
use crate::db::Database;

/// Everything a handler needs, built once at startup and shared by all
/// workers.
pub struct ServerContext {
    pub db: Database,

    pub jwt_generator: JwtTokenGenerator,
    pub jwt_validator: JwtTokenValidator,

    pub policy: AuthorizationPolicy,

    pub cfg: ServerConfig,
}

impl ServerContext {
    #[cfg(test)]
    pub fn new_test() -> Self {
        let secret = b"test_secret";
        Self {
            db: Database::memory().unwrap(),
            jwt_generator: JwtTokenGenerator::new(secret, 60),
            jwt_validator: JwtTokenValidator::new(secret),
            policy: AuthorizationPolicy::default(),
            cfg: ServerConfig::default(),
        }
    }
}
