use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A question posted to the forum
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::questions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Question {
    /// Unique identifier, assigned by the database
    id: i32,

    /// The user who asked the question
    user_id: i32,

    /// Short title shown in listings
    title: String,

    /// Body of the question
    content: String,

    /// The answer the asker marked as accepted, if any
    selected_answer_id: Option<i32>,

    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Question {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_user_id(&self) -> i32 {
        self.user_id
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_content(&self) -> String {
        self.content.clone()
    }

    pub fn get_selected_answer_id(&self) -> Option<i32> {
        self.selected_answer_id
    }

    /// Gets the creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the last update timestamp as a DateTime<Utc>
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

/// Insertable form of a question; the id is assigned on insert
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::questions)]
pub struct NewQuestion {
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewQuestion {
    /// Creates a new question owned by `user_id`, timestamped now
    pub fn new(user_id: i32, title: String, content: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            user_id,
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}
