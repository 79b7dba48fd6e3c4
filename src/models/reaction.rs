use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Kinds of reaction a user can leave on a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionKind {
    Like,
    Dislike,
    Laugh,
    Cry,
    Heart,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "Like",
            ReactionKind::Dislike => "Dislike",
            ReactionKind::Laugh => "Laugh",
            ReactionKind::Cry => "Cry",
            ReactionKind::Heart => "Heart",
        }
    }
}

/// A single user's reaction to a question
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::question_reactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuestionReaction {
    pub id: i32,
    pub question_id: i32,
    pub user_id: i32,
    pub reaction: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::question_reactions)]
pub struct NewQuestionReaction {
    pub question_id: i32,
    pub user_id: i32,
    pub reaction: String,
    pub created_at: NaiveDateTime,
}

impl NewQuestionReaction {
    pub fn new(question_id: i32, user_id: i32, reaction: ReactionKind) -> Self {
        Self {
            question_id,
            user_id,
            reaction: reaction.as_str().to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }
}
