/// Reusable projections shared by every query that shows a user or a comment
///
/// Each preset is a serializable shape plus a batch loader that fills it for a
/// set of rows with a fixed number of queries, whatever the number of rows.

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Comment, Cosmetic, User};
use crate::schema::{cosmetics, user_cosmetics, users};

fn to_utc(ts: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(ts, Utc)
}

/// Public payload of a cosmetic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosmeticPayload {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub cosmetic_type: String,
    pub source: String,
    pub data: Option<serde_json::Value>,
}

/// An equipped cosmetic, wrapped the way the user preset has always exposed it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquippedCosmetic {
    pub cosmetic: CosmeticPayload,
}

/// The `userWithCosmetics` projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithCosmetics {
    pub id: i32,
    pub username: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub cosmetics: Vec<EquippedCosmetic>,
}

/// The `commentV2` projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentV2 {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub nsfw: bool,
    pub tos_violation: bool,
    pub content: String,
    pub user: UserWithCosmetics,
}

impl TryFrom<Cosmetic> for CosmeticPayload {
    type Error = anyhow::Error;

    fn try_from(cosmetic: Cosmetic) -> Result<Self> {
        let data = cosmetic
            .data
            .as_deref()
            .map(|raw| serde_json::from_str::<serde_json::Value>(raw))
            .transpose()
            .map_err(|e| anyhow!("Invalid data for cosmetic {}: {}", cosmetic.id, e))?;

        Ok(Self {
            id: cosmetic.id,
            name: cosmetic.name,
            cosmetic_type: cosmetic.cosmetic_type,
            source: cosmetic.source,
            data,
        })
    }
}

/// Loads the `userWithCosmetics` projection for every id in `user_ids`
///
/// Ids without a matching user are absent from the returned map.
pub fn load_users_with_cosmetics(
    conn: &mut SqliteConnection,
    user_ids: &[i32],
) -> Result<HashMap<i32, UserWithCosmetics>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = users::table
        .filter(users::id.eq_any(user_ids))
        .select(User::as_select())
        .load(conn)?;

    let equipped: Vec<(i32, Cosmetic)> = user_cosmetics::table
        .inner_join(cosmetics::table)
        .filter(user_cosmetics::user_id.eq_any(user_ids))
        .filter(user_cosmetics::equipped_at.is_not_null())
        .order_by(cosmetics::id.asc())
        .select((user_cosmetics::user_id, Cosmetic::as_select()))
        .load(conn)?;

    debug!("Loaded {} users with {} equipped cosmetics", rows.len(), equipped.len());

    let mut projected: HashMap<i32, UserWithCosmetics> = rows
        .into_iter()
        .map(|user| {
            let projection = UserWithCosmetics {
                id: user.id,
                username: user.username,
                deleted_at: user.deleted_at.map(to_utc),
                image: user.image,
                cosmetics: Vec::new(),
            };
            (user.id, projection)
        })
        .collect();

    for (user_id, cosmetic) in equipped {
        if let Some(user) = projected.get_mut(&user_id) {
            user.cosmetics.push(EquippedCosmetic { cosmetic: cosmetic.try_into()? });
        }
    }

    Ok(projected)
}

/// Projects comment rows to `commentV2`, keeping their order
pub fn load_comments_v2(conn: &mut SqliteConnection, comments: Vec<Comment>) -> Result<Vec<CommentV2>> {
    let mut author_ids: Vec<i32> = comments.iter().map(|c| c.user_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let authors = load_users_with_cosmetics(conn, &author_ids)?;

    comments
        .into_iter()
        .map(|comment| {
            let user = authors
                .get(&comment.user_id)
                .cloned()
                .ok_or_else(|| anyhow!("Author {} of comment {} not found", comment.user_id, comment.id))?;
            Ok(CommentV2 {
                id: comment.id,
                created_at: to_utc(comment.created_at),
                nsfw: comment.nsfw,
                tos_violation: comment.tos_violation,
                content: comment.content,
                user,
            })
        })
        .collect()
}
