use crate::db::{self, DbPool};
use crate::models::{
    MetricPeriod, NewAnswer, NewComment, NewQuestion, NewQuestionReaction, NewTag, NewUser, QuestionComment,
    QuestionRank, QuestionTag, ReactionKind,
};
use crate::schema::{
    answers, comments, cosmetics, question_comments, question_ranks, question_reactions, question_tags, questions,
    tags, user_cosmetics, users,
};
use chrono::{NaiveDateTime, TimeDelta, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use proptest::prelude::*;
use std::sync::Arc;

/// Sets up a test database with migrations applied
///
/// Each call gets its own shared in-memory database: plain ":memory:" would
/// give every pooled connection a separate database, while a unique URI with
/// `cache=shared` lets the pool see one schema and keeps tests isolated.
///
/// ### Returns
///
/// An Arc-wrapped database connection pool connected to the in-memory database
pub fn setup_test_db() -> Arc<DbPool> {
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).expect("Failed to create pool");

    let mut conn = pool.get().expect("Failed to get connection");
    db::run_migrations(&mut conn).expect("Failed to run migrations");

    Arc::new(pool)
}

/// Timestamp `minutes` minutes before now
pub fn minutes_ago(minutes: i64) -> NaiveDateTime {
    Utc::now().naive_utc() - TimeDelta::minutes(minutes)
}

pub fn create_user(conn: &mut SqliteConnection, username: &str) -> i32 {
    diesel::insert_into(users::table)
        .values(NewUser::new(username))
        .returning(users::id)
        .get_result(conn)
        .expect("Failed to create user")
}

/// Gives `user_id` the cosmetic `cosmetic_id`, creating the cosmetic on first
/// use
pub fn equip_cosmetic(conn: &mut SqliteConnection, user_id: i32, cosmetic_id: i32, name: &str, equipped: bool) {
    diesel::insert_or_ignore_into(cosmetics::table)
        .values((
            cosmetics::id.eq(cosmetic_id),
            cosmetics::name.eq(name),
            cosmetics::cosmetic_type.eq("Badge"),
            cosmetics::source.eq("Trophy"),
            cosmetics::data.eq(Some(r#"{"url":"badge.png"}"#)),
        ))
        .execute(conn)
        .expect("Failed to create cosmetic");

    diesel::insert_into(user_cosmetics::table)
        .values((
            user_cosmetics::user_id.eq(user_id),
            user_cosmetics::cosmetic_id.eq(cosmetic_id),
            user_cosmetics::obtained_at.eq(minutes_ago(60)),
            user_cosmetics::equipped_at.eq(equipped.then(|| minutes_ago(30))),
        ))
        .execute(conn)
        .expect("Failed to give cosmetic");
}

pub fn create_question(conn: &mut SqliteConnection, user_id: i32, title: &str) -> i32 {
    diesel::insert_into(questions::table)
        .values(NewQuestion::new(user_id, title.to_string(), format!("{} body", title)))
        .returning(questions::id)
        .get_result(conn)
        .expect("Failed to create question")
}

/// Creates a question asked `minutes` minutes ago
pub fn create_question_at(conn: &mut SqliteConnection, user_id: i32, title: &str, minutes: i64) -> i32 {
    let id = create_question(conn, user_id, title);
    diesel::update(questions::table.find(id))
        .set(questions::created_at.eq(minutes_ago(minutes)))
        .execute(conn)
        .expect("Failed to backdate question");
    id
}

pub fn create_answer(conn: &mut SqliteConnection, question_id: i32, user_id: i32) -> i32 {
    diesel::insert_into(answers::table)
        .values(NewAnswer::new(question_id, user_id, "An answer".to_string()))
        .returning(answers::id)
        .get_result(conn)
        .expect("Failed to create answer")
}

pub fn backdate_answer(conn: &mut SqliteConnection, answer_id: i32, minutes: i64) {
    diesel::update(answers::table.find(answer_id))
        .set(answers::created_at.eq(minutes_ago(minutes)))
        .execute(conn)
        .expect("Failed to backdate answer");
}

pub fn tag_question(conn: &mut SqliteConnection, question_id: i32, name: &str) -> i32 {
    diesel::insert_or_ignore_into(tags::table)
        .values(NewTag::new(name.to_string()))
        .execute(conn)
        .expect("Failed to create tag");
    let tag_id = tags::table
        .filter(tags::name.eq(name))
        .select(tags::id)
        .first(conn)
        .expect("Failed to read tag");
    diesel::insert_into(question_tags::table)
        .values(QuestionTag::new(question_id, tag_id))
        .execute(conn)
        .expect("Failed to tag question");
    tag_id
}

pub fn question_tag_names(conn: &mut SqliteConnection, question_id: i32) -> Vec<String> {
    question_tags::table
        .inner_join(tags::table)
        .filter(question_tags::question_id.eq(question_id))
        .order_by(tags::name.asc())
        .select(tags::name)
        .load(conn)
        .expect("Failed to load tags")
}

/// Leaves a reaction `minutes` minutes ago
pub fn react(conn: &mut SqliteConnection, question_id: i32, user_id: i32, kind: ReactionKind, minutes: i64) -> i32 {
    let mut reaction = NewQuestionReaction::new(question_id, user_id, kind);
    reaction.created_at = minutes_ago(minutes);
    diesel::insert_into(question_reactions::table)
        .values(reaction)
        .returning(question_reactions::id)
        .get_result(conn)
        .expect("Failed to react")
}

/// Comments on a question `minutes` minutes ago
pub fn add_comment(conn: &mut SqliteConnection, question_id: i32, user_id: i32, content: &str, minutes: i64) -> i32 {
    let mut comment = NewComment::new(user_id, content.to_string());
    comment.created_at = minutes_ago(minutes);
    comment.updated_at = comment.created_at;
    let comment_id = diesel::insert_into(comments::table)
        .values(comment)
        .returning(comments::id)
        .get_result(conn)
        .expect("Failed to create comment");
    diesel::insert_into(question_comments::table)
        .values(QuestionComment { question_id, comment_id })
        .execute(conn)
        .expect("Failed to attach comment");
    comment_id
}

/// Reads the stored rank row of a question
pub fn stored_rank(conn: &mut SqliteConnection, question_id: i32) -> Option<QuestionRank> {
    question_ranks::table
        .find(question_id)
        .select(QuestionRank::as_select())
        .first(conn)
        .optional()
        .expect("Failed to read rank")
}

/// Stores a rank row holding `(hearts, answers)` for `period` and zeros
/// elsewhere
pub fn set_rank(conn: &mut SqliteConnection, question_id: i32, period: MetricPeriod, hearts: i32, answers: i32) {
    let mut rank = stored_rank(conn, question_id).unwrap_or(QuestionRank { question_id, ..Default::default() });
    rank.set_counts(period, crate::models::PeriodCounts { heart_count: hearts, answer_count: answers });
    diesel::replace_into(question_ranks::table)
        .values(&rank)
        .execute(conn)
        .expect("Failed to store rank");
}

/// Generates strings mixing letters, digits, whitespace and punctuation
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    "[ a-zA-Z0-9_\\-\\.,!?%&'\"]{0,40}"
}

/// Generates a tag name with no surrounding whitespace
pub fn arb_tag_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9\\-]{0,15}"
}

pub fn arb_period() -> impl Strategy<Value = MetricPeriod> {
    prop::sample::select(MetricPeriod::ALL.to_vec())
}

#[test]
fn test_setup_test_db_creates_schema() {
    let pool = setup_test_db();
    let conn = &mut pool.get().unwrap();

    let user = create_user(conn, "alice");
    let question = create_question(conn, user, "How?");
    tag_question(conn, question, "rust");

    assert_eq!(question_tag_names(conn, question), vec!["rust".to_string()]);
}
