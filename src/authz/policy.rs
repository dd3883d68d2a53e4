use super::chain::ChainAuthorizer;
use super::{
    permitted_categories, Action, Authorizer, AuthzRequest, AuthzResponse, CategorySet, Identity,
    Owned, Role,
};

/// Decides whether a caller may perform an operation. Every check is pure
/// and answers `false` for a caller without identity.
pub struct AuthorizationPolicy {
    chain: ChainAuthorizer,
}

impl Default for AuthorizationPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorizationPolicy {
    pub fn new() -> Self {
        Self {
            chain: ChainAuthorizer::default(),
        }
    }

    /// True iff `role` may author content in `category`. Unknown roles and
    /// unknown category names both fail closed.
    pub fn can_create_in_category(&self, role: &Role, category: &str) -> bool {
        self.allowed(AuthzRequest {
            role: Some(role),
            user_id: None,
            action: Action::Create { category },
        })
    }

    pub fn can_modify_comment(&self, identity: Option<&Identity>, comment: &impl Owned) -> bool {
        self.can_modify(identity, comment)
    }

    pub fn can_modify_post(&self, identity: Option<&Identity>, post: &impl Owned) -> bool {
        self.can_modify(identity, post)
    }

    pub fn can_list_all_users(&self, identity: Option<&Identity>) -> bool {
        self.allowed(AuthzRequest {
            role: identity.map(|i| &i.role),
            user_id: identity.map(|i| i.id),
            action: Action::ListUsers,
        })
    }

    pub fn allowed_categories_for(&self, role: &Role) -> CategorySet {
        permitted_categories(role).iter().copied().collect()
    }

    fn can_modify(&self, identity: Option<&Identity>, target: &impl Owned) -> bool {
        self.allowed(AuthzRequest {
            role: identity.map(|i| &i.role),
            user_id: identity.map(|i| i.id),
            action: Action::Modify {
                author_id: target.author_id(),
            },
        })
    }

    fn allowed(&self, req: AuthzRequest) -> bool {
        matches!(self.chain.authorize_request(&req), AuthzResponse::Ok)
    }
}

#[cfg(test)]
mod tests {
    use crate::authz::Category;

    use super::*;

    struct Authored(u64);

    impl Owned for Authored {
        fn author_id(&self) -> u64 {
            self.0
        }
    }

    fn identity(id: u64, role: &str) -> Identity {
        Identity {
            id,
            role: Role::from(role),
        }
    }

    #[test]
    fn test_allowed_categories_for_unknown_roles() {
        let policy = AuthorizationPolicy::new();
        for role in ["", "Admin", "ADMIN", "guest", "superuser", "verified user"] {
            assert!(policy.allowed_categories_for(&Role::from(role)).is_empty());
        }
    }

    #[test]
    fn test_allowed_categories_for() {
        let policy = AuthorizationPolicy::new();
        let all: CategorySet = [Category::Tutorials, Category::Blogs, Category::Resume]
            .into_iter()
            .collect();
        assert_eq!(policy.allowed_categories_for(&Role::Admin), all);
        assert_eq!(policy.allowed_categories_for(&Role::Contributor), all);
        assert_eq!(
            policy.allowed_categories_for(&Role::VerifiedUser),
            [Category::Blogs, Category::Resume].into_iter().collect()
        );
        assert_eq!(
            policy.allowed_categories_for(&Role::User),
            [Category::Resume].into_iter().collect()
        );
    }

    #[test]
    fn test_can_modify() {
        let policy = AuthorizationPolicy::new();

        let owner = identity(5, "user");
        assert!(policy.can_modify_comment(Some(&owner), &Authored(5)));
        assert!(policy.can_modify_post(Some(&owner), &Authored(5)));
        assert!(!policy.can_modify_comment(Some(&owner), &Authored(9)));
        assert!(!policy.can_modify_post(Some(&owner), &Authored(9)));

        let admin = identity(1, "admin");
        assert!(policy.can_modify_comment(Some(&admin), &Authored(9)));
        assert!(policy.can_modify_post(Some(&admin), &Authored(9)));

        // Ownership does not depend on the role
        let stranger = identity(7, "mystery");
        assert!(policy.can_modify_comment(Some(&stranger), &Authored(7)));
        assert!(!policy.can_modify_post(Some(&stranger), &Authored(9)));

        for role in ["contributor", "verifieduser"] {
            let ident = identity(3, role);
            assert!(policy.can_modify_post(Some(&ident), &Authored(3)));
            assert!(!policy.can_modify_post(Some(&ident), &Authored(4)));
        }

        assert!(!policy.can_modify_comment(None, &Authored(5)));
        assert!(!policy.can_modify_post(None, &Authored(0)));
    }

    #[test]
    fn test_can_create_in_category() {
        let policy = AuthorizationPolicy::new();

        assert!(!policy.can_create_in_category(&Role::VerifiedUser, "tutorials"));
        assert!(policy.can_create_in_category(&Role::VerifiedUser, "blogs"));
        assert!(policy.can_create_in_category(&Role::Admin, "tutorials"));
        assert!(policy.can_create_in_category(&Role::Contributor, "tutorials"));
        assert!(policy.can_create_in_category(&Role::User, "resume"));
        assert!(!policy.can_create_in_category(&Role::User, "blogs"));
        assert!(!policy.can_create_in_category(&Role::Admin, "news"));
        assert!(!policy.can_create_in_category(&Role::Admin, ""));
        assert!(!policy.can_create_in_category(&Role::from("guest"), "resume"));
    }

    #[test]
    fn test_can_list_all_users() {
        let policy = AuthorizationPolicy::new();
        assert!(policy.can_list_all_users(Some(&identity(1, "admin"))));
        for role in ["contributor", "verifieduser", "user", "root"] {
            assert!(!policy.can_list_all_users(Some(&identity(1, role))));
        }
        assert!(!policy.can_list_all_users(None));
    }
}
