use std::collections::HashMap;

use anyhow::{Result, anyhow};
use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::sqlite::{Sqlite, SqliteConnection};
use tracing::{debug, info, instrument};

use crate::db::{DbPool, with_retry};
use crate::dto::{
    GetQuestionsInput, Paged, QuestionSort, QuestionStatus, SetQuestionAnswerInput, TagInput,
    UpsertQuestionInput, UpsertedQuestion,
};
use crate::errors::RecordNotFound;
use crate::models::{
    Comment, MetricPeriod, NewQuestion, NewTag, PeriodCounts, Question, QuestionReaction, QuestionTag, Tag,
};
use crate::schema::{
    answers, comments, question_comments, question_ranks, question_reactions, question_tags, questions, tags,
};
use crate::selectors::{self, CommentV2, UserWithCosmetics};

/// Which relations the listing loads for every question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionListSelect {
    /// Period whose rank pair is loaded
    pub rank_period: MetricPeriod,
}

/// Which of the question's reactions the detail view loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionSelect {
    /// Load none; no query is issued
    None,
    /// Load the reactions left by this user only
    OfUser(i32),
}

/// Which relations the detail view loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionDetailSelect {
    pub rank_period: MetricPeriod,
    pub reactions: ReactionSelect,
    /// Number of most recent comments loaded
    pub comment_limit: i64,
}

/// A tag reached through its `question_tags` join row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOnQuestion {
    pub tag: Tag,
}

/// A comment reached through its `question_comments` join row
#[derive(Debug, Clone, PartialEq)]
pub struct CommentOnQuestion {
    pub comment: CommentV2,
}

/// A question as loaded for the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionListRecord {
    pub id: i32,
    pub title: String,
    pub tags: Vec<TagOnQuestion>,
    /// Counts for the selected period; `None` while the question is unranked
    pub rank: Option<PeriodCounts>,
    pub selected_answer_id: Option<i32>,
}

/// A question as loaded for the detail view
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDetailRecord {
    pub question: Question,
    pub user: UserWithCosmetics,
    pub tags: Vec<TagOnQuestion>,
    pub rank: Option<PeriodCounts>,
    pub reactions: Vec<QuestionReaction>,
    /// Most recent comments, oldest first
    pub comments: Vec<CommentOnQuestion>,
    /// Total number of comments on the question
    pub comment_count: i64,
}

type RankPairQuery<'a> = question_ranks::BoxedQuery<'a, Sqlite, (Integer, Integer, Integer)>;

/// Selects `(question_id, heart_count, answer_count)` from the column pair
/// stored for `period`
fn rank_pair_query<'a>(period: MetricPeriod) -> RankPairQuery<'a> {
    use crate::schema::question_ranks::dsl::*;

    match period {
        MetricPeriod::Day => question_ranks.select((question_id, heart_count_day, answer_count_day)).into_boxed(),
        MetricPeriod::Week => question_ranks.select((question_id, heart_count_week, answer_count_week)).into_boxed(),
        MetricPeriod::Month => question_ranks.select((question_id, heart_count_month, answer_count_month)).into_boxed(),
        MetricPeriod::Year => question_ranks.select((question_id, heart_count_year, answer_count_year)).into_boxed(),
        MetricPeriod::AllTime => {
            question_ranks.select((question_id, heart_count_all_time, answer_count_all_time)).into_boxed()
        }
    }
}

type QuestionIdQuery<'a> = diesel::dsl::IntoBoxed<
    'a,
    diesel::dsl::Select<diesel::dsl::LeftJoin<questions::table, question_ranks::table>, questions::id>,
    Sqlite,
>;

/// A LIKE pattern matching `text` anywhere; backslash, `%` and `_` match
/// themselves
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Ids of the questions matching the listing filters, unordered and unpaged
fn filtered_question_ids(input: &GetQuestionsInput) -> QuestionIdQuery<'static> {
    let mut query = questions::table
        .left_join(question_ranks::table)
        .select(questions::id)
        .into_boxed();

    if let Some(text) = input.query.as_deref().filter(|q| !q.is_empty()) {
        query = query.filter(questions::title.like(contains_pattern(text)).escape('\\'));
    }

    if let Some(name) = input.tagname.as_deref().filter(|t| !t.is_empty()) {
        query = query.filter(
            questions::id.eq_any(
                question_tags::table
                    .inner_join(tags::table)
                    .filter(tags::name.eq(name.to_string()))
                    .select(question_tags::question_id),
            ),
        );
    }

    match input.status {
        Some(QuestionStatus::Answered) => query = query.filter(questions::selected_answer_id.is_not_null()),
        Some(QuestionStatus::Pending) => query = query.filter(questions::selected_answer_id.is_null()),
        None => {}
    }

    query
}

/// Orders the listing; most liked sorts on the selected period's heart count
/// and puts unranked questions last
fn ordered(query: QuestionIdQuery<'static>, sort: QuestionSort, period: MetricPeriod) -> QuestionIdQuery<'static> {
    let query = match sort {
        QuestionSort::Newest => query,
        QuestionSort::MostLiked => match period {
            MetricPeriod::Day => query.order_by(question_ranks::heart_count_day.nullable().desc()),
            MetricPeriod::Week => query.order_by(question_ranks::heart_count_week.nullable().desc()),
            MetricPeriod::Month => query.order_by(question_ranks::heart_count_month.nullable().desc()),
            MetricPeriod::Year => query.order_by(question_ranks::heart_count_year.nullable().desc()),
            MetricPeriod::AllTime => query.order_by(question_ranks::heart_count_all_time.nullable().desc()),
        },
    };

    query
        .then_order_by(questions::created_at.desc())
        .then_order_by(questions::id.desc())
}

/// Loads the tags of every question in `question_ids`, grouped by question
fn load_tags(conn: &mut SqliteConnection, question_ids: &[i32]) -> QueryResult<HashMap<i32, Vec<TagOnQuestion>>> {
    let rows: Vec<(i32, Tag)> = question_tags::table
        .inner_join(tags::table)
        .filter(question_tags::question_id.eq_any(question_ids))
        .order_by((question_tags::question_id.asc(), tags::name.asc()))
        .select((question_tags::question_id, Tag::as_select()))
        .load(conn)?;

    let mut grouped: HashMap<i32, Vec<TagOnQuestion>> = HashMap::new();
    for (question_id, tag) in rows {
        grouped.entry(question_id).or_default().push(TagOnQuestion { tag });
    }
    Ok(grouped)
}

/// Loads the rank pair of `period` for every ranked question in `question_ids`
fn load_rank_pairs(
    conn: &mut SqliteConnection,
    question_ids: &[i32],
    period: MetricPeriod,
) -> QueryResult<HashMap<i32, PeriodCounts>> {
    let rows: Vec<(i32, i32, i32)> = rank_pair_query(period)
        .filter(question_ranks::question_id.eq_any(question_ids.to_vec()))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(question_id, heart_count, answer_count)| (question_id, PeriodCounts { heart_count, answer_count }))
        .collect())
}

/// Lists one page of questions
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `input` - Filters, ordering and paging of the listing
/// * `select` - Relations to load for each question
///
/// ### Returns
///
/// The page of questions together with the paging metadata
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - Any of the queries fails
#[instrument(skip(pool, input), fields(page = input.page, limit = input.limit, period = %select.rank_period))]
pub async fn get_questions(
    pool: &DbPool,
    input: &GetQuestionsInput,
    select: QuestionListSelect,
) -> Result<Paged<QuestionListRecord>> {
    debug!("Listing questions with filters: {:?}", input);

    let conn = &mut pool.get()?;

    let total_items: i64 = filtered_question_ids(input).count().get_result(conn)?;

    let ids: Vec<i32> = ordered(filtered_question_ids(input), input.sort, select.rank_period)
        .offset(input.offset())
        .limit(input.limit)
        .load(conn)?;

    let rows: Vec<(i32, String, Option<i32>)> = questions::table
        .filter(questions::id.eq_any(&ids))
        .select((questions::id, questions::title, questions::selected_answer_id))
        .load(conn)?;
    let mut rows: HashMap<i32, (String, Option<i32>)> =
        rows.into_iter().map(|(id, title, answer)| (id, (title, answer))).collect();

    let mut tags = load_tags(conn, &ids)?;
    let ranks = load_rank_pairs(conn, &ids, select.rank_period)?;

    let items = ids
        .iter()
        .filter_map(|id| {
            let (title, selected_answer_id) = rows.remove(id)?;
            Some(QuestionListRecord {
                id: *id,
                title,
                tags: tags.remove(id).unwrap_or_default(),
                rank: ranks.get(id).copied(),
                selected_answer_id,
            })
        })
        .collect::<Vec<_>>();

    let page_size = input.limit.max(1);
    let total_pages = (total_items + page_size - 1) / page_size;

    info!("Retrieved {} of {} questions", items.len(), total_items);

    Ok(Paged {
        items,
        total_items,
        current_page: input.page,
        page_size: input.limit,
        total_pages,
    })
}

/// Retrieves a question with the relations named by `select`
///
/// ### Returns
///
/// `None` if no question has this id
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - Any of the queries fails
/// - The question's author no longer exists
#[instrument(skip(pool), fields(question_id = %id))]
pub async fn get_question_detail(
    pool: &DbPool,
    id: i32,
    select: QuestionDetailSelect,
) -> Result<Option<QuestionDetailRecord>> {
    debug!("Retrieving question detail");

    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let Some(question) = questions::table
            .find(id)
            .select(Question::as_select())
            .first(conn)
            .optional()?
        else {
            debug!("Question not found");
            return Ok(None);
        };

        let user = selectors::load_users_with_cosmetics(conn, &[question.get_user_id()])?
            .remove(&question.get_user_id())
            .ok_or_else(|| anyhow!("Author {} of question {} not found", question.get_user_id(), id))?;

        let tags = load_tags(conn, &[id])?.remove(&id).unwrap_or_default();

        let rank = load_rank_pairs(conn, &[id], select.rank_period)?.remove(&id);

        let reactions = match select.reactions {
            ReactionSelect::None => Vec::new(),
            ReactionSelect::OfUser(user_id) => question_reactions::table
                .filter(question_reactions::question_id.eq(id))
                .filter(question_reactions::user_id.eq(user_id))
                .order_by(question_reactions::id.asc())
                .select(QuestionReaction::as_select())
                .load(conn)?,
        };

        let mut recent: Vec<Comment> = question_comments::table
            .inner_join(comments::table)
            .filter(question_comments::question_id.eq(id))
            .order_by((comments::created_at.desc(), comments::id.desc()))
            .limit(select.comment_limit)
            .select(Comment::as_select())
            .load(conn)?;
        recent.reverse();

        let comments = selectors::load_comments_v2(conn, recent)?
            .into_iter()
            .map(|comment| CommentOnQuestion { comment })
            .collect();

        let comment_count: i64 = question_comments::table
            .filter(question_comments::question_id.eq(id))
            .count()
            .get_result(conn)?;

        Ok(Some(QuestionDetailRecord {
            question,
            user,
            tags,
            rank,
            reactions,
            comments,
            comment_count,
        }))
    })
}

/// Resolves the tags of an upsert to ids, creating tags named for the first
/// time
fn resolve_tag_ids(conn: &mut SqliteConnection, tags_in: &[TagInput]) -> Result<Vec<i32>> {
    let mut ids = Vec::with_capacity(tags_in.len());

    for tag in tags_in {
        let id = match tag.id {
            Some(tag_id) => tags::table
                .find(tag_id)
                .select(tags::id)
                .first::<i32>(conn)
                .optional()?
                .ok_or(RecordNotFound("Tag"))?,
            None => {
                let name = tag.name.trim();
                let existing = tags::table
                    .filter(tags::name.eq(name))
                    .select(tags::id)
                    .first::<i32>(conn)
                    .optional()?;
                match existing {
                    Some(tag_id) => tag_id,
                    None => {
                        debug!("Creating tag {}", name);
                        diesel::insert_into(tags::table)
                            .values(NewTag::new(name.to_string()))
                            .returning(tags::id)
                            .get_result(conn)?
                    }
                }
            }
        };

        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    Ok(ids)
}

/// Makes `tag_ids` the exact tag set of the question
fn replace_question_tags(conn: &mut SqliteConnection, question_id: i32, tag_ids: &[i32]) -> QueryResult<()> {
    diesel::delete(
        question_tags::table
            .filter(question_tags::question_id.eq(question_id))
            .filter(question_tags::tag_id.ne_all(tag_ids)),
    )
    .execute(conn)?;

    for tag_id in tag_ids {
        diesel::insert_or_ignore_into(question_tags::table)
            .values(QuestionTag::new(question_id, *tag_id))
            .execute(conn)?;
    }

    Ok(())
}

fn upsert_question_tx(conn: &mut SqliteConnection, input: &UpsertQuestionInput, user_id: i32) -> Result<UpsertedQuestion> {
    let question_id = match input.id {
        None => diesel::insert_into(questions::table)
            .values(NewQuestion::new(user_id, input.title.clone(), input.content.clone()))
            .returning(questions::id)
            .get_result::<i32>(conn)?,
        Some(id) => {
            let updated = diesel::update(questions::table.find(id))
                .set((
                    questions::title.eq(&input.title),
                    questions::content.eq(&input.content),
                    questions::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;
            if updated == 0 {
                return Err(RecordNotFound("Question").into());
            }
            id
        }
    };

    if let Some(tags_in) = &input.tags {
        let tag_ids = resolve_tag_ids(conn, tags_in)?;
        replace_question_tags(conn, question_id, &tag_ids)?;
        debug!("Question {} now has {} tags", question_id, tag_ids.len());
    }

    Ok(UpsertedQuestion {
        id: question_id,
        title: input.title.clone(),
    })
}

/// Creates a question, or updates it when the input carries an id
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `input` - Title, content and optional replacement tag set
/// * `user_id` - The author, recorded when the question is created
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The question to update or a tag referenced by id does not exist
///   ([`RecordNotFound`])
/// - Any statement fails; nothing is written in that case
#[instrument(skip(pool, input), fields(question_id = ?input.id, user_id = %user_id))]
pub async fn upsert_question(pool: &DbPool, input: &UpsertQuestionInput, user_id: i32) -> Result<UpsertedQuestion> {
    debug!("Upserting question");

    let mut conn = pool.get()?;

    let upserted = with_retry(&mut conn, |conn| {
        conn.transaction::<_, anyhow::Error, _>(|conn| upsert_question_tx(conn, input, user_id))
    })
    .await?;

    info!("Successfully upserted question with id: {}", upserted.id);
    Ok(upserted)
}

/// Deletes a question along with its comments; join rows, reactions,
/// answers and the rank row cascade
///
/// ### Errors
///
/// Returns [`RecordNotFound`] if no question has this id.
#[instrument(skip(pool), fields(question_id = %id))]
pub async fn delete_question(pool: &DbPool, id: i32) -> Result<()> {
    debug!("Deleting question");

    let mut conn = pool.get()?;

    with_retry(&mut conn, |conn| {
        conn.transaction::<_, anyhow::Error, _>(|conn| {
            let comment_ids: Vec<i32> = question_comments::table
                .filter(question_comments::question_id.eq(id))
                .select(question_comments::comment_id)
                .load(conn)?;

            let deleted = diesel::delete(questions::table.find(id)).execute(conn)?;
            if deleted == 0 {
                return Err(RecordNotFound("Question").into());
            }

            diesel::delete(comments::table.filter(comments::id.eq_any(&comment_ids))).execute(conn)?;
            Ok(())
        })
    })
    .await?;

    info!("Successfully deleted question with id: {}", id);
    Ok(())
}

/// Marks `answer_id` as the question's selected answer, or clears the
/// selection when it is `None`
///
/// ### Errors
///
/// Returns [`RecordNotFound`] if the question does not exist or the answer
/// does not belong to it.
#[instrument(skip(pool), fields(question_id = %input.id, answer_id = ?input.answer_id))]
pub async fn set_question_answer(pool: &DbPool, input: SetQuestionAnswerInput) -> Result<()> {
    debug!("Setting selected answer");

    let mut conn = pool.get()?;

    with_retry(&mut conn, |conn| {
        conn.transaction::<_, anyhow::Error, _>(|conn| {
            if let Some(answer_id) = input.answer_id {
                let belongs: i64 = answers::table
                    .filter(answers::id.eq(answer_id))
                    .filter(answers::question_id.eq(input.id))
                    .count()
                    .get_result(conn)?;
                if belongs == 0 {
                    let question_exists: i64 = questions::table.find(input.id).count().get_result(conn)?;
                    let entity = if question_exists == 0 { "Question" } else { "Answer" };
                    return Err(RecordNotFound(entity).into());
                }
            }

            let updated = diesel::update(questions::table.find(input.id))
                .set((
                    questions::selected_answer_id.eq(input.answer_id),
                    questions::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;
            if updated == 0 {
                return Err(RecordNotFound("Question").into());
            }
            Ok(())
        })
    })
    .await?;

    info!("Question {} selected answer is now {:?}", input.id, input.answer_id);
    Ok(())
}
