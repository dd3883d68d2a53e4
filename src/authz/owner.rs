use super::{Action, Authorizer, AuthzRequest, AuthzResponse};

/// Grants modification to the author of a resource, whatever their role.
pub struct OwnerAuthorizer;

impl OwnerAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for OwnerAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        match (req.action, req.user_id) {
            (Action::Modify { author_id }, Some(user_id)) if author_id == user_id => {
                AuthzResponse::Ok
            }
            _ => AuthzResponse::Continue,
        }
    }
}
