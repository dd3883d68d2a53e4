use serde_json::json;

use crate::db::types::CreateResumeParams;
use crate::db::Database;

pub fn run_resume_tests(db: &Database) {
    db.with_transaction(|tx| {
        tx.create_resume(CreateResumeParams {
            user_id: 1,
            layers: json!([{"type": "header", "text": "Jane"}]),
            colors: json!({"primary": "#fff"}),
            now: 100,
        })?;
        tx.create_resume(CreateResumeParams {
            user_id: 1,
            layers: json!([]),
            colors: json!({}),
            now: 200,
        })?;
        tx.create_resume(CreateResumeParams {
            user_id: 2,
            layers: json!([]),
            colors: json!({}),
            now: 300,
        })?;
        Ok(())
    })
    .unwrap();

    db.with_transaction(|tx| {
        let resumes = tx.list_user_resumes(1)?;
        assert_eq!(resumes.len(), 2);
        assert_eq!(resumes[0].created_at, 200);
        assert_eq!(resumes[1].layers, json!([{"type": "header", "text": "Jane"}]));
        assert_eq!(resumes[1].colors["primary"], "#fff");

        assert!(tx.list_user_resumes(9)?.is_empty());
        Ok(())
    })
    .unwrap();
}
