use super::{Action, Authorizer, AuthzRequest, AuthzResponse};

/// Grants admins every ownership-based action and user listing.
///
/// Category rights are not decided here: admins pass those through the
/// permission table like every other role.
pub struct AdminAuthorizer;

impl AdminAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for AdminAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        let is_admin = req.role.map(|r| r.is_admin()).unwrap_or(false);
        if !is_admin {
            return AuthzResponse::Continue;
        }

        match req.action {
            Action::Modify { .. } | Action::ListUsers => AuthzResponse::Ok,
            Action::Create { .. } => AuthzResponse::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::authz::Role;

    use super::*;

    #[test]
    fn test_admin() {
        let authorizer = AdminAuthorizer::new();
        let admin = Role::Admin;
        let user = Role::User;

        let req = AuthzRequest {
            role: Some(&admin),
            user_id: Some(1),
            action: Action::Modify { author_id: 9 },
        };
        assert_eq!(authorizer.authorize_request(&req), AuthzResponse::Ok);

        let req = AuthzRequest {
            role: Some(&admin),
            user_id: Some(1),
            action: Action::ListUsers,
        };
        assert_eq!(authorizer.authorize_request(&req), AuthzResponse::Ok);

        let req = AuthzRequest {
            role: Some(&admin),
            user_id: Some(1),
            action: Action::Create {
                category: "tutorials",
            },
        };
        assert_eq!(authorizer.authorize_request(&req), AuthzResponse::Continue);

        let req = AuthzRequest {
            role: Some(&user),
            user_id: Some(1),
            action: Action::ListUsers,
        };
        assert_eq!(authorizer.authorize_request(&req), AuthzResponse::Continue);

        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AdminAuthorizer>();
    }
}
