use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

/// An answer to insert under a question
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::answers)]
pub struct NewAnswer {
    pub question_id: i32,
    pub user_id: i32,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewAnswer {
    pub fn new(question_id: i32, user_id: i32, content: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            question_id,
            user_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}
