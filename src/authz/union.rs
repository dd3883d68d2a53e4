use super::admin::AdminAuthorizer;
use super::anonymous::AnonymousAuthorizer;
use super::category::CategoryAuthorizer;
use super::owner::OwnerAuthorizer;
use super::{Authorizer, AuthzRequest, AuthzResponse};

pub enum UnionAuthorizer {
    Anonymous(AnonymousAuthorizer),
    Admin(AdminAuthorizer),
    Owner(OwnerAuthorizer),
    Category(CategoryAuthorizer),
}

impl Authorizer for UnionAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        match self {
            UnionAuthorizer::Anonymous(a) => a.authorize_request(req),
            UnionAuthorizer::Admin(a) => a.authorize_request(req),
            UnionAuthorizer::Owner(a) => a.authorize_request(req),
            UnionAuthorizer::Category(a) => a.authorize_request(req),
        }
    }
}
