use crate::authz::Role;
use crate::db::types::{CreateUserParams, Page, PatchUserParams, UserPassword};
use crate::db::Database;
use crate::types::user::UserPatch;

pub fn run_user_tests(db: &Database) {
    test_create(db);
    test_get(db);
    test_conflict(db);
    test_update(db);
    test_delete(db);
}

fn test_create(db: &Database) {
    let users = [
        CreateUserParams {
            username: String::from("whiteknight"),
            email: String::from("white@test.com"),
            password: String::from("white_hash"),
            salt: String::from("white_salt"),
            role: Role::Admin,
            now: 50,
        },
        CreateUserParams {
            username: String::from("blackknight"),
            email: String::from("black@test.com"),
            password: String::from("black_hash"),
            salt: String::from("black_salt"),
            role: Role::User,
            now: 100,
        },
    ];

    db.with_transaction(|tx| {
        for (idx, user) in users.into_iter().enumerate() {
            let id = tx.create_user(user)?;
            assert_eq!(id, idx as u64 + 1);
        }
        Ok(())
    })
    .unwrap();
}

fn test_get(db: &Database) {
    db.with_transaction(|tx| {
        let white = tx.get_user(1)?.unwrap();
        assert_eq!(white.username, "whiteknight");
        assert_eq!(white.email, "white@test.com");
        assert_eq!(white.role, Role::Admin);
        assert_eq!(white.profile_picture, None);
        assert_eq!(white.created_at, 50);

        assert!(tx.get_user(100)?.is_none());

        let page = Page {
            offset: 0,
            limit: 9,
            ascending: false,
        };
        let users = tx.list_users(page)?;
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "blackknight");
        assert_eq!(users[1].username, "whiteknight");

        let users = tx.list_users(Page {
            offset: 1,
            limit: 1,
            ascending: true,
        })?;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "blackknight");

        assert_eq!(tx.count_users(None)?, 2);
        assert_eq!(tx.count_users(Some(100))?, 1);
        assert_eq!(tx.count_users(Some(101))?, 0);

        let up = tx.get_user_password("black@test.com")?;
        assert_eq!(
            up,
            Some(UserPassword {
                id: 2,
                password: String::from("black_hash"),
                salt: String::from("black_salt"),
            })
        );
        assert!(tx.get_user_password("none@test.com")?.is_none());

        Ok(())
    })
    .unwrap();
}

fn test_conflict(db: &Database) {
    db.with_transaction(|tx| {
        assert!(tx.has_user_conflict(Some("whiteknight"), Some("x@test.com"), None)?);
        assert!(tx.has_user_conflict(Some("someone"), Some("black@test.com"), None)?);
        assert!(!tx.has_user_conflict(Some("someone"), Some("x@test.com"), None)?);
        assert!(!tx.has_user_conflict(Some("whiteknight"), None, Some(1))?);
        assert!(tx.has_user_conflict(None, Some("white@test.com"), Some(2))?);
        assert!(!tx.has_user_conflict(None, None, None)?);
        Ok(())
    })
    .unwrap();
}

fn test_update(db: &Database) {
    db.with_transaction(|tx| {
        tx.update_user(PatchUserParams {
            id: 1,
            patch: UserPatch {
                password: Some(String::from("new_hash")),
                ..Default::default()
            },
            salt: Some(String::from("new_salt")),
            updated_at: 4000,
        })?;

        let white = tx.get_user(1)?.unwrap();
        assert_eq!(white.updated_at, 4000);
        assert_eq!(white.username, "whiteknight");

        let up = tx.get_user_password("white@test.com")?.unwrap();
        assert_eq!(up.password, "new_hash");
        assert_eq!(up.salt, "new_salt");

        tx.update_user(PatchUserParams {
            id: 2,
            patch: UserPatch {
                username: Some(String::from("greyknight")),
                profile_picture: Some(String::from("https://img/grey.png")),
                ..Default::default()
            },
            salt: None,
            updated_at: 5000,
        })?;

        let grey = tx.get_user(2)?.unwrap();
        assert_eq!(grey.username, "greyknight");
        assert_eq!(grey.profile_picture.as_deref(), Some("https://img/grey.png"));
        assert_eq!(grey.updated_at, 5000);

        let up = tx.get_user_password("black@test.com")?.unwrap();
        assert_eq!(up.password, "black_hash");

        Ok(())
    })
    .unwrap();
}

fn test_delete(db: &Database) {
    db.with_transaction(|tx| {
        assert!(tx.delete_user(2)?);
        assert!(!tx.delete_user(2)?);
        Ok(())
    })
    .unwrap();

    db.with_transaction(|tx| {
        assert!(tx.get_user(2)?.is_none());
        assert_eq!(tx.count_users(None)?, 1);
        Ok(())
    })
    .unwrap();
}
