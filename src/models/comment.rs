use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A comment row; questions reach their comments through [`QuestionComment`]
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Comment {
    pub id: i32,
    pub user_id: i32,
    pub content: String,
    pub nsfw: bool,
    pub tos_violation: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewComment {
    pub user_id: i32,
    pub content: String,
    pub nsfw: bool,
    pub tos_violation: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewComment {
    pub fn new(user_id: i32, content: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            user_id,
            content,
            nsfw: false,
            tos_violation: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Join row attaching a comment to a question
#[derive(Queryable, Selectable, Insertable, Debug, Clone, Copy, PartialEq, Eq)]
#[diesel(table_name = crate::schema::question_comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuestionComment {
    pub question_id: i32,
    pub comment_id: i32,
}
