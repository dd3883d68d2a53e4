use super::{permitted_categories, Action, Authorizer, AuthzRequest, AuthzResponse, Category};

/// Decides create requests from the role's row in the category table.
/// Unknown roles and unknown category names are both rejected.
pub struct CategoryAuthorizer;

impl CategoryAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for CategoryAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        let category = match req.action {
            Action::Create { category } => category,
            _ => return AuthzResponse::Continue,
        };

        let (role, category) = match (req.role, Category::parse(category)) {
            (Some(role), Some(category)) => (role, category),
            _ => return AuthzResponse::Unauthorized,
        };

        if permitted_categories(role).contains(&category) {
            AuthzResponse::Ok
        } else {
            AuthzResponse::Unauthorized
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::authz::Role;

    use super::*;

    fn authorize(role: &str, category: &str) -> AuthzResponse {
        let role = Role::from(role);
        let req = AuthzRequest {
            role: Some(&role),
            user_id: Some(1),
            action: Action::Create { category },
        };
        CategoryAuthorizer::new().authorize_request(&req)
    }

    #[test]
    fn test_category() {
        assert_eq!(authorize("admin", "tutorials"), AuthzResponse::Ok);
        assert_eq!(authorize("contributor", "blogs"), AuthzResponse::Ok);
        assert_eq!(authorize("verifieduser", "blogs"), AuthzResponse::Ok);
        assert_eq!(
            authorize("verifieduser", "tutorials"),
            AuthzResponse::Unauthorized
        );
        assert_eq!(authorize("user", "resume"), AuthzResponse::Ok);
        assert_eq!(authorize("user", "blogs"), AuthzResponse::Unauthorized);
        assert_eq!(authorize("admin", "news"), AuthzResponse::Unauthorized);
        assert_eq!(authorize("guest", "resume"), AuthzResponse::Unauthorized);

        let role = Role::User;
        let req = AuthzRequest {
            role: Some(&role),
            user_id: Some(1),
            action: Action::ListUsers,
        };
        assert_eq!(
            CategoryAuthorizer::new().authorize_request(&req),
            AuthzResponse::Continue
        );
    }
}
