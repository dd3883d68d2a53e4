mod comment;
mod resume;
mod user;

use anyhow::{bail, Result};

use crate::authz::Role;

use super::types::CreateUserParams;
use super::Database;

pub fn run_tests(db: &Database) {
    user::run_user_tests(db);
    post::run_post_tests(db);
    comment::run_comment_tests(db);
    resume::run_resume_tests(db);

    test_rollback(db);
}

fn test_rollback(db: &Database) {
    let result: Result<()> = db.with_transaction(|tx| {
        tx.create_user(CreateUserParams {
            username: String::from("rollback"),
            email: String::from("rollback@test.com"),
            password: String::from("hash"),
            salt: String::from("salt"),
            role: Role::User,
            now: 50,
        })
        .unwrap();

        bail!("rollback");
    });
    assert!(result.is_err());

    db.with_transaction(|tx| {
        assert!(!tx.has_user_conflict(Some("rollback"), None, None)?);
        assert!(tx.get_user_password("rollback@test.com")?.is_none());
        Ok(())
    })
    .unwrap();
}
