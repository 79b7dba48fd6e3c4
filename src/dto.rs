use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::models::{MetricPeriod, PeriodCounts};
use crate::selectors::{CommentV2, UserWithCosmetics};

/// Largest page a listing may request
pub const MAX_PAGE_SIZE: i64 = 200;

/// Page size used when a listing does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 20;

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Ordering of the question listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuestionSort {
    Newest,
    #[default]
    MostLiked,
}

/// Restricts the listing to questions with or without a selected answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionStatus {
    Answered,
    Pending,
}

/// Query parameters of `GET /questions`
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetQuestionsInput {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: i64,

    /// Page size
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Substring the title must contain
    #[serde(default)]
    pub query: Option<String>,

    /// Exact name of a tag the question must carry
    #[serde(default)]
    pub tagname: Option<String>,

    #[serde(default)]
    pub sort: QuestionSort,

    /// Period whose rank aggregate is reported (and sorted on)
    #[serde(default)]
    pub period: MetricPeriod,

    #[serde(default)]
    pub status: Option<QuestionStatus>,
}

impl Default for GetQuestionsInput {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            query: None,
            tagname: None,
            sort: QuestionSort::default(),
            period: MetricPeriod::default(),
            status: None,
        }
    }
}

impl GetQuestionsInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.limit) {
            return Err(ApiError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if self.page < 1 {
            return Err(ApiError::InvalidInput("page must be at least 1".to_string()));
        }
        if (self.page - 1).checked_mul(self.limit).is_none() {
            return Err(ApiError::InvalidInput("page is out of range".to_string()));
        }
        Ok(())
    }

    /// Number of rows skipped before this page; call after [`Self::validate`]
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Identifies a single question
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetByIdInput {
    pub id: i32,
}

/// A tag attached through an upsert: by id when known, by name otherwise
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TagInput {
    #[serde(default)]
    pub id: Option<i32>,
    pub name: String,
}

/// Body of `POST /questions`; creates when `id` is absent, updates otherwise
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpsertQuestionInput {
    #[serde(default)]
    pub id: Option<i32>,
    pub title: String,
    #[serde(default)]
    pub content: String,

    /// Replacement tag set; absent leaves the current tags untouched
    #[serde(default)]
    pub tags: Option<Vec<TagInput>>,
}

impl UpsertQuestionInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::InvalidInput("title must not be empty".to_string()));
        }
        if let Some(tags) = &self.tags {
            if tags.iter().any(|t| t.name.trim().is_empty()) {
                return Err(ApiError::InvalidInput("tag names must not be empty".to_string()));
            }
        }
        Ok(())
    }
}

/// Body of `PUT /questions/{id}/answer`; `null` clears the selection
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetAnswerDto {
    #[serde(default)]
    pub answer_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetQuestionAnswerInput {
    pub id: i32,
    pub answer_id: Option<i32>,
}

/// A tag as exposed by the API, without its join row
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub id: i32,
    pub name: String,
}

/// Rank aggregate under its period-independent keys; both are omitted when the
/// question has not been ranked yet
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RankCounts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_count: Option<i32>,
}

impl From<Option<PeriodCounts>> for RankCounts {
    fn from(counts: Option<PeriodCounts>) -> Self {
        match counts {
            Some(c) => Self {
                heart_count: Some(c.heart_count),
                answer_count: Some(c.answer_count),
            },
            None => Self::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionListItem {
    pub id: i32,
    pub title: String,
    pub tags: Vec<TagRef>,
    pub rank: RankCounts,
    pub selected_answer_id: Option<i32>,
}

/// One page of a listing plus the paging metadata computed by the repository
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total_items: i64,
    pub current_page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Paged<T> {
    /// Swaps the items of the page, keeping its metadata
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

/// The caller's own reaction to a question
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRef {
    pub id: i32,
    pub user_id: i32,
    pub reaction: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionCount {
    pub comments: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub content: String,
    pub selected_answer_id: Option<i32>,
    pub user: UserWithCosmetics,
    pub tags: Vec<TagRef>,
    pub rank: RankCounts,
    pub user_reactions: Vec<ReactionRef>,
    pub comments: Vec<CommentV2>,
    #[serde(rename = "_count")]
    pub count: QuestionCount,
}

/// What an upsert hands back to the caller
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpsertedQuestion {
    pub id: i32,
    pub title: String,
}
