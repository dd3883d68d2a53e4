use anyhow::{bail, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::authz::{Identity, Role};

const ISSUER: &str = "trivoxel/api";

/// Registered claims (RFC 7519) plus the caller's role.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    exp: i64,
    iat: i64,
    iss: String,
    nbf: i64,
    /// User id.
    sub: String,
    role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token: String,
    pub expire_after: i64,
}

/// Signs HS256 tokens with the shared `jwt_secret`.
pub struct JwtTokenGenerator {
    key: EncodingKey,
    expiry: i64,
}

impl JwtTokenGenerator {
    pub fn new(secret: &[u8], expiry: u64) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
            expiry: expiry as i64,
        }
    }

    pub fn generate_token(&self, identity: &Identity, now: i64) -> Result<Token> {
        let claims = Claims {
            exp: now + self.expiry,
            iat: now,
            iss: String::from(ISSUER),
            nbf: now,
            sub: identity.id.to_string(),
            role: identity.role.to_string(),
        };

        match encode(&Header::new(Algorithm::HS256), &claims, &self.key) {
            Ok(token) => Ok(Token {
                token,
                expire_after: claims.exp,
            }),
            Err(e) => bail!("generate jwt token failed: {e}"),
        }
    }
}

pub struct JwtTokenValidator {
    key: DecodingKey,
}

impl JwtTokenValidator {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
        }
    }

    pub fn validate_token(&self, token: &str, now: i64) -> Result<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "nbf", "sub"]);

        let claims = match decode::<Claims>(token, &self.key, &validation) {
            Ok(data) => data.claims,
            Err(e) => bail!("validate jwt token failed: {e}"),
        };

        if now >= claims.exp {
            bail!("validate jwt token failed: token expired");
        }
        if now < claims.nbf {
            bail!("validate jwt token failed: token not yet valid");
        }

        let id: u64 = match claims.sub.parse() {
            Ok(id) => id,
            Err(_) => bail!("validate jwt token failed: invalid subject '{}'", claims.sub),
        };

        Ok(Identity {
            id,
            role: Role::from(claims.role),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::time::current_timestamp;

    use super::*;

    #[test]
    fn test_jwt() {
        let generator = JwtTokenGenerator::new(b"test_secret", 60);
        let validator = JwtTokenValidator::new(b"test_secret");

        let identities = [
            Identity {
                id: 1,
                role: Role::Admin,
            },
            Identity {
                id: 27,
                role: Role::VerifiedUser,
            },
            Identity {
                id: 3,
                role: Role::from("guest"),
            },
        ];

        let now = current_timestamp();
        for identity in identities {
            let token = generator.generate_token(&identity, now).unwrap();
            assert_eq!(token.expire_after, now + 60);

            let result = validator.validate_token(&token.token, now).unwrap();
            assert_eq!(result, identity);

            let result = validator.validate_token(&token.token, now + 80);
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_wrong_secret() {
        let generator = JwtTokenGenerator::new(b"test_secret", 60);
        let validator = JwtTokenValidator::new(b"other_secret");

        let identity = Identity {
            id: 5,
            role: Role::User,
        };
        let now = current_timestamp();
        let token = generator.generate_token(&identity, now).unwrap();
        assert!(validator.validate_token(&token.token, now).is_err());
        assert!(validator.validate_token("not.a.token", now).is_err());
    }
}
