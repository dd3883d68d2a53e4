use super::{Authorizer, AuthzRequest, AuthzResponse};

/// Rejects every request that arrives without a verified identity. Placed
/// first in the chain so nothing after it sees an anonymous caller.
pub struct AnonymousAuthorizer;

impl AnonymousAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for AnonymousAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        if req.role.is_none() {
            return AuthzResponse::Unauthorized;
        }
        AuthzResponse::Continue
    }
}
