use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A forum user, as far as the question feature needs to know about one
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: Option<String>,
    pub image: Option<String>,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub username: Option<String>,
    pub image: Option<String>,
    pub created_at: NaiveDateTime,
}

impl NewUser {
    pub fn new(username: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            image: None,
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// A decoration (badge, name plate...) a user can own and equip
#[derive(Queryable, Selectable, Insertable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::cosmetics)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Cosmetic {
    pub id: i32,
    pub name: String,
    pub cosmetic_type: String,
    pub source: String,
    /// Raw JSON payload interpreted by clients
    pub data: Option<String>,
}

/// Ownership of a cosmetic; only equipped ones are shown next to a user
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::user_cosmetics)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserCosmetic {
    pub user_id: i32,
    pub cosmetic_id: i32,
    pub obtained_at: NaiveDateTime,
    pub equipped_at: Option<NaiveDateTime>,
}
