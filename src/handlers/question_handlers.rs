use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::auth::{AuthUser, Caller};
use crate::db::DbPool;
use crate::dto::{
    GetByIdInput, GetQuestionsInput, Paged, QuestionCount, QuestionDetail, QuestionListItem, RankCounts,
    ReactionRef, SetAnswerDto, SetQuestionAnswerInput, TagRef, UpsertQuestionInput, UpsertedQuestion,
};
use crate::errors::{ApiError, db_call};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::MetricPeriod;
use crate::repo::{
    self, QuestionDetailRecord, QuestionDetailSelect, QuestionListRecord, QuestionListSelect, ReactionSelect,
    TagOnQuestion,
};

/// Number of comments shown with a question
pub const DETAIL_COMMENT_LIMIT: i64 = 5;

fn unwrap_tags(tags: Vec<TagOnQuestion>) -> Vec<TagRef> {
    tags.into_iter()
        .map(|TagOnQuestion { tag }| TagRef {
            id: tag.get_id(),
            name: tag.get_name(),
        })
        .collect()
}

fn to_list_item(record: QuestionListRecord) -> QuestionListItem {
    QuestionListItem {
        id: record.id,
        title: record.title,
        tags: unwrap_tags(record.tags),
        rank: RankCounts::from(record.rank),
        selected_answer_id: record.selected_answer_id,
    }
}

fn to_detail(record: QuestionDetailRecord) -> QuestionDetail {
    let QuestionDetailRecord {
        question,
        user,
        tags,
        rank,
        reactions,
        comments,
        comment_count,
    } = record;

    QuestionDetail {
        id: question.get_id(),
        created_at: question.get_created_at(),
        updated_at: question.get_updated_at(),
        title: question.get_title(),
        content: question.get_content(),
        selected_answer_id: question.get_selected_answer_id(),
        user,
        tags: unwrap_tags(tags),
        rank: RankCounts::from(rank),
        user_reactions: reactions
            .into_iter()
            .map(|r| ReactionRef {
                id: r.id,
                user_id: r.user_id,
                reaction: r.reaction,
            })
            .collect(),
        comments: comments.into_iter().map(|c| c.comment).collect(),
        count: QuestionCount { comments: comment_count },
    }
}

/// Handler for listing questions
///
/// This function handles GET requests to `/questions`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `input` - Paging, filters, ordering and the rank period, from the query string
///
/// ### Returns
///
/// One page of questions, each with its tags and the rank of the requested period
#[instrument(skip(pool, input), fields(page = input.page, limit = input.limit, period = %input.period))]
pub async fn get_questions_handler(
    State(pool): State<Arc<DbPool>>,
    ApiQuery(input): ApiQuery<GetQuestionsInput>,
) -> Result<Json<Paged<QuestionListItem>>, ApiError> {
    debug!("Listing questions");

    input.validate()?;

    let select = QuestionListSelect { rank_period: input.period };
    let page = db_call(repo::get_questions(&pool, &input, select)).await?;

    info!("Returning {} of {} questions", page.items.len(), page.total_items);

    Ok(Json(page.map_items(to_list_item)))
}

/// Handler for retrieving a single question with its author, tags, rank,
/// the caller's reactions and its latest comments
///
/// This function handles GET requests to `/questions/{id}`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `caller` - The caller; anonymous callers never see reactions
/// * `input` - The question ID extracted from the URL path
///
/// ### Returns
///
/// The question detail as JSON, or 404 if no question has this id
#[instrument(skip(pool), fields(question_id = %input.id, user_id = ?caller.user_id))]
pub async fn get_question_detail_handler(
    State(pool): State<Arc<DbPool>>,
    caller: Caller,
    ApiPath(input): ApiPath<GetByIdInput>,
) -> Result<Json<QuestionDetail>, ApiError> {
    debug!("Getting question detail");

    let select = QuestionDetailSelect {
        rank_period: MetricPeriod::AllTime,
        reactions: match caller.user_id {
            Some(user_id) => ReactionSelect::OfUser(user_id),
            None => ReactionSelect::None,
        },
        comment_limit: DETAIL_COMMENT_LIMIT,
    };

    let record = db_call(repo::get_question_detail(&pool, input.id, select))
        .await?
        .ok_or(ApiError::NotFound("Question"))?;

    Ok(Json(to_detail(record)))
}

/// Handler for creating or updating a question
///
/// This function handles POST requests to `/questions`. A payload without an
/// id creates a question owned by the caller; with an id it updates that
/// question. A `tags` list, when present, becomes the question's tag set.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `user` - The authenticated caller
/// * `payload` - Title, content and tags of the question
///
/// ### Returns
///
/// The id and title of the upserted question
#[instrument(skip(pool, payload), fields(user_id = %user.user_id, question_id = ?payload.id))]
pub async fn upsert_question_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    ApiJson(payload): ApiJson<UpsertQuestionInput>,
) -> Result<Json<UpsertedQuestion>, ApiError> {
    info!("Upserting question");

    payload.validate()?;

    let upserted = db_call(repo::upsert_question(&pool, &payload, user.user_id)).await?;

    Ok(Json(upserted))
}

/// Handler for deleting a question
///
/// This function handles DELETE requests to `/questions/{id}`.
///
/// ### Returns
///
/// An empty 200 response, or 404 if no question has this id
#[instrument(skip(pool), fields(question_id = %input.id))]
pub async fn delete_question_handler(
    State(pool): State<Arc<DbPool>>,
    ApiPath(input): ApiPath<GetByIdInput>,
) -> Result<(), ApiError> {
    info!("Deleting question");

    db_call(repo::delete_question(&pool, input.id)).await
}

/// Handler for selecting (or clearing) the accepted answer of a question
///
/// This function handles PUT requests to `/questions/{id}/answer`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `input` - The question ID extracted from the URL path
/// * `payload` - The answer to select; `null` clears the selection
#[instrument(skip(pool), fields(question_id = %input.id, answer_id = ?payload.answer_id))]
pub async fn set_question_answer_handler(
    State(pool): State<Arc<DbPool>>,
    ApiPath(input): ApiPath<GetByIdInput>,
    ApiJson(payload): ApiJson<SetAnswerDto>,
) -> Result<(), ApiError> {
    info!("Setting question answer");

    let input = SetQuestionAnswerInput {
        id: input.id,
        answer_id: payload.answer_id,
    };

    db_call(repo::set_question_answer(&pool, input)).await
}
