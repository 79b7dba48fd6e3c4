//! Common test utilities for Askboard integration tests
//!
//! This file contains shared functions for all integration tests: test
//! application setup, a request helper, and seeding of rows the API cannot
//! create (users, answers, reactions, comments).

#![allow(dead_code)]

use askboard::{
    create_app,
    db::{DbPool, init_pool, run_migrations},
    models::{NewAnswer, NewComment, NewQuestionReaction, NewUser, QuestionComment, ReactionKind},
    schema::{answers, comments, question_comments, question_reactions, users},
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{TimeDelta, Utc};
use diesel::prelude::*;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// A test application together with the pool backing it
pub struct TestApp {
    pub app: Router,
    pub pool: Arc<DbPool>,
}

/// Creates a test application with a private in-memory SQLite database
///
/// ### Returns
///
/// The router with all routes and the pool it uses, for seeding
pub fn create_test_app() -> TestApp {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = Arc::new(init_pool(&database_url).unwrap());

    let conn = &mut pool.get().unwrap();
    run_migrations(conn).unwrap();

    TestApp {
        app: create_app(pool.clone()),
        pool,
    }
}

/// Sends a request and returns the status with the parsed JSON body
/// (`Value::Null` when the body is empty)
///
/// ### Arguments
///
/// * `app` - The test application
/// * `method` - HTTP method
/// * `uri` - Request path and query
/// * `user_id` - Identity forwarded in the `x-user-id` header, if any
/// * `body` - JSON body, if any
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: Option<i32>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(id) = user_id {
        builder = builder.header(askboard::auth::USER_ID_HEADER, id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub fn seed_user(pool: &DbPool, username: &str) -> i32 {
    diesel::insert_into(users::table)
        .values(NewUser::new(username))
        .returning(users::id)
        .get_result(&mut pool.get().unwrap())
        .unwrap()
}

/// Creates a user with a fixed id
pub fn seed_user_with_id(pool: &DbPool, id: i32, username: &str) -> i32 {
    diesel::insert_into(users::table)
        .values((
            users::id.eq(id),
            users::username.eq(username),
            users::created_at.eq(Utc::now().naive_utc()),
        ))
        .returning(users::id)
        .get_result(&mut pool.get().unwrap())
        .unwrap()
}

pub fn seed_answer(pool: &DbPool, question_id: i32, user_id: i32) -> i32 {
    diesel::insert_into(answers::table)
        .values(NewAnswer::new(question_id, user_id, "Try this".to_string()))
        .returning(answers::id)
        .get_result(&mut pool.get().unwrap())
        .unwrap()
}

pub fn seed_reaction(pool: &DbPool, question_id: i32, user_id: i32, kind: ReactionKind) {
    diesel::insert_into(question_reactions::table)
        .values(NewQuestionReaction::new(question_id, user_id, kind))
        .execute(&mut pool.get().unwrap())
        .unwrap();
}

/// Comments on a question; later `order` values are more recent
pub fn seed_comment(pool: &DbPool, question_id: i32, user_id: i32, content: &str, order: i64) -> i32 {
    let conn = &mut pool.get().unwrap();
    let mut comment = NewComment::new(user_id, content.to_string());
    comment.created_at = Utc::now().naive_utc() - TimeDelta::minutes(100 - order);
    let comment_id = diesel::insert_into(comments::table)
        .values(comment)
        .returning(comments::id)
        .get_result(conn)
        .unwrap();
    diesel::insert_into(question_comments::table)
        .values(QuestionComment { question_id, comment_id })
        .execute(conn)
        .unwrap();
    comment_id
}

/// Creates a question through the API and returns its id
pub async fn create_question(app: &Router, user_id: i32, title: &str, tags: &[&str]) -> i32 {
    let tags: Vec<Value> = tags.iter().map(|name| serde_json::json!({ "name": name })).collect();
    let (status, body) = send(
        app,
        "POST",
        "/questions",
        Some(user_id),
        Some(serde_json::json!({ "title": title, "content": format!("{} body", title), "tags": tags })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_i64().unwrap() as i32
}
