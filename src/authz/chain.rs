use super::admin::AdminAuthorizer;
use super::anonymous::AnonymousAuthorizer;
use super::category::CategoryAuthorizer;
use super::owner::OwnerAuthorizer;
use super::union::UnionAuthorizer;
use super::{Authorizer, AuthzRequest, AuthzResponse};

/// A chain of authorizers tried in order until one of them decides.
///
/// An exhausted chain answers `Unauthorized`: nothing is allowed unless some
/// authorizer explicitly grants it.
pub struct ChainAuthorizer {
    authorizers: Vec<UnionAuthorizer>,
}

impl ChainAuthorizer {
    pub fn new(authorizers: Vec<UnionAuthorizer>) -> Self {
        Self { authorizers }
    }
}

impl Default for ChainAuthorizer {
    fn default() -> Self {
        Self::new(vec![
            UnionAuthorizer::Anonymous(AnonymousAuthorizer::new()),
            UnionAuthorizer::Admin(AdminAuthorizer::new()),
            UnionAuthorizer::Owner(OwnerAuthorizer::new()),
            UnionAuthorizer::Category(CategoryAuthorizer::new()),
        ])
    }
}

impl Authorizer for ChainAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        for authorizer in self.authorizers.iter() {
            match authorizer.authorize_request(req) {
                AuthzResponse::Ok => return AuthzResponse::Ok,
                AuthzResponse::Continue => continue,
                AuthzResponse::Unauthorized => return AuthzResponse::Unauthorized,
            }
        }

        AuthzResponse::Unauthorized
    }
}

#[cfg(test)]
mod tests {
    use crate::authz::{Action, Role};

    use super::*;

    #[test]
    fn test_chain() {
        let chain = ChainAuthorizer::default();
        let admin = Role::Admin;
        let user = Role::User;

        // Anonymous callers stop at the first authorizer
        let req = AuthzRequest {
            role: None,
            user_id: Some(5),
            action: Action::Modify { author_id: 5 },
        };
        assert_eq!(chain.authorize_request(&req), AuthzResponse::Unauthorized);

        let req = AuthzRequest {
            role: Some(&admin),
            user_id: Some(1),
            action: Action::Modify { author_id: 9 },
        };
        assert_eq!(chain.authorize_request(&req), AuthzResponse::Ok);

        let req = AuthzRequest {
            role: Some(&user),
            user_id: Some(9),
            action: Action::Modify { author_id: 9 },
        };
        assert_eq!(chain.authorize_request(&req), AuthzResponse::Ok);

        // Nobody grants this, the chain runs out
        let req = AuthzRequest {
            role: Some(&user),
            user_id: Some(5),
            action: Action::ListUsers,
        };
        assert_eq!(chain.authorize_request(&req), AuthzResponse::Unauthorized);

        let empty = ChainAuthorizer::new(vec![]);
        assert_eq!(empty.authorize_request(&req), AuthzResponse::Unauthorized);
    }
}
