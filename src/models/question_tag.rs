use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Represents an association between a question and a tag
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::question_tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuestionTag {
    /// The ID of the question
    question_id: i32,

    /// The ID of the tag
    tag_id: i32,

    /// When this association was created
    created_at: NaiveDateTime,
}

impl QuestionTag {
    /// Creates a new question tag association
    ///
    /// ### Arguments
    ///
    /// * `question_id` - The ID of the question
    /// * `tag_id` - The ID of the tag
    ///
    /// ### Returns
    ///
    /// A new `QuestionTag` instance linking the question to the tag
    pub fn new(question_id: i32, tag_id: i32) -> Self {
        Self {
            question_id,
            tag_id,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_question_id(&self) -> i32 {
        self.question_id
    }

    pub fn get_tag_id(&self) -> i32 {
        self.tag_id
    }

    /// Gets the creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
