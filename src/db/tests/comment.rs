use crate::db::types::{CreateCommentParams, Page};
use crate::db::Database;

pub fn run_comment_tests(db: &Database) {
    test_create(db);
    test_list(db);
    test_update(db);
    test_delete(db);
}

fn test_create(db: &Database) {
    let comments = [
        (1, 1, "first", 100),
        (1, 3, "second", 200),
        (2, 1, "elsewhere", 300),
    ];
    db.with_transaction(|tx| {
        for (post_id, user_id, content, now) in comments {
            tx.create_comment(CreateCommentParams {
                content: String::from(content),
                post_id,
                user_id,
                now,
            })?;
        }
        Ok(())
    })
    .unwrap();

    db.with_transaction(|tx| {
        let comment = tx.get_comment(1)?.unwrap();
        assert_eq!(comment.content, "first");
        assert!(comment.likes.is_empty());
        assert_eq!(comment.number_of_likes, 0);
        assert!(tx.get_comment(99)?.is_none());
        Ok(())
    })
    .unwrap();
}

fn test_list(db: &Database) {
    db.with_transaction(|tx| {
        let comments = tx.list_post_comments(1)?;
        let contents: Vec<_> = comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["second", "first"]);
        assert!(tx.list_post_comments(42)?.is_empty());

        let page = Page {
            offset: 0,
            limit: 9,
            ascending: false,
        };
        let all = tx.list_comments(None, page)?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].content, "elsewhere");

        let own = tx.list_comments(Some(1), page)?;
        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|c| c.user_id == 1));

        let paged = tx.list_comments(
            None,
            Page {
                offset: 1,
                limit: 1,
                ascending: true,
            },
        )?;
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].content, "second");

        assert_eq!(tx.count_comments(None, None)?, 3);
        assert_eq!(tx.count_comments(Some(3), None)?, 1);
        assert_eq!(tx.count_comments(None, Some(200))?, 2);
        assert_eq!(tx.count_comments(Some(1), Some(200))?, 1);
        Ok(())
    })
    .unwrap();
}

fn test_update(db: &Database) {
    db.with_transaction(|tx| {
        tx.update_comment_content(1, "first, edited", 500)?;
        tx.update_comment_likes(1, &[3, 7])?;

        let comment = tx.get_comment(1)?.unwrap();
        assert_eq!(comment.content, "first, edited");
        assert_eq!(comment.likes, vec![3, 7]);
        assert_eq!(comment.number_of_likes, 2);
        // Liking is not an edit
        assert_eq!(comment.updated_at, 500);
        assert_eq!(comment.created_at, 100);

        tx.update_comment_likes(1, &[])?;
        let comment = tx.get_comment(1)?.unwrap();
        assert!(comment.likes.is_empty());
        assert_eq!(comment.number_of_likes, 0);
        assert_eq!(comment.updated_at, 500);
        Ok(())
    })
    .unwrap();
}

fn test_delete(db: &Database) {
    db.with_transaction(|tx| {
        assert!(tx.delete_comment(3)?);
        assert!(!tx.delete_comment(3)?);

        assert_eq!(tx.delete_post_comments(1)?, 2);
        assert_eq!(tx.count_comments(None, None)?, 0);
        Ok(())
    })
    .unwrap();
}
