use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Represents a tag that can be attached to questions
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Tag {
    /// Unique identifier for the tag
    id: i32,

    /// The name of the tag, unique across all tags
    name: String,

    /// When this tag was created
    created_at: NaiveDateTime,
}

impl Tag {
    /// Gets the tag's ID
    ///
    /// ### Returns
    ///
    /// The unique identifier of the tag
    pub fn get_id(&self) -> i32 {
        self.id
    }

    /// Gets the tag's name
    ///
    /// ### Returns
    ///
    /// The name of the tag
    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    /// Gets the tag's creation timestamp as a DateTime<Utc>
    ///
    /// ### Returns
    ///
    /// The timestamp when this tag was created
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}

/// Insertable form of a tag
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag {
    pub name: String,
    pub created_at: NaiveDateTime,
}

impl NewTag {
    /// Creates a new tag
    ///
    /// ### Arguments
    ///
    /// * `name` - The name of the tag
    ///
    /// ### Returns
    ///
    /// A new `NewTag` ready to insert, timestamped now
    pub fn new(name: String) -> Self {
        Self {
            name,
            created_at: Utc::now().naive_utc(),
        }
    }
}
