//! Integration tests for the question endpoints
//!
//! These drive the full router: extractors, validation, the repository and
//! the error mapping.

use askboard::models::ReactionKind;
use askboard::repo;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::*;

fn ids(page: &Value) -> Vec<i64> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect()
}

/// Tests the happy path of every endpoint on one question
#[tokio::test]
async fn test_question_lifecycle() {
    let TestApp { app, pool } = create_test_app();
    let alice = seed_user(&pool, "alice");

    let id = create_question(&app, alice, "How do lifetimes work?", &["rust", "lifetimes"]).await;

    let (status, detail) = send(&app, "GET", &format!("/questions/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "How do lifetimes work?");
    assert_eq!(detail["content"], "How do lifetimes work? body");
    assert_eq!(detail["user"]["id"], alice);
    assert_eq!(detail["user"]["username"], "alice");
    let tag_names: Vec<&str> = detail["tags"].as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(tag_names, vec!["lifetimes", "rust"]);
    assert!(detail["tags"][0]["id"].is_i64());
    assert_eq!(detail["_count"]["comments"], 0);
    assert_eq!(detail["userReactions"], json!([]));

    let answer = seed_answer(&pool, id, alice);
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/questions/{}/answer", id),
        Some(alice),
        Some(json!({ "answerId": answer })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = send(&app, "GET", "/questions?status=Answered", None, None).await;
    assert_eq!(ids(&page), vec![id as i64]);
    assert_eq!(page["items"][0]["selectedAnswerId"], answer);

    let (status, _) = send(&app, "DELETE", &format!("/questions/{}", id), Some(alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &format!("/questions/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Question not found");
}

/// Tests the listing: wrappers removed, canonical rank keys, paging metadata
#[tokio::test]
async fn test_list_questions_shape() {
    let TestApp { app, pool } = create_test_app();
    let alice = seed_user(&pool, "alice");
    let bob = seed_user(&pool, "bob");
    let first = create_question(&app, alice, "First", &["rust"]).await;
    let second = create_question(&app, alice, "Second", &[]).await;
    create_question(&app, alice, "Third", &[]).await;
    seed_reaction(&pool, first, bob, ReactionKind::Heart);
    seed_reaction(&pool, first, alice, ReactionKind::Heart);
    seed_reaction(&pool, second, bob, ReactionKind::Heart);

    // Before the first refresh no question carries a rank
    let (_, page) = send(&app, "GET", "/questions?sort=Newest", None, None).await;
    assert_eq!(page["items"][0]["rank"], json!({}));

    repo::refresh_question_ranks(&pool).await.unwrap();

    let (status, page) = send(&app, "GET", "/questions?limit=2&period=Week", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalItems"], 3);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["currentPage"], 1);
    assert_eq!(page["pageSize"], 2);
    assert_eq!(ids(&page), vec![first as i64, second as i64]);

    let item = &page["items"][0];
    assert_eq!(item["rank"], json!({ "heartCount": 2, "answerCount": 0 }));
    assert_eq!(item["tags"], json!([{ "id": item["tags"][0]["id"], "name": "rust" }]));
    assert!(item.get("questionTags").is_none());
    assert!(item["rank"].get("heartCountWeek").is_none());
}

/// Tests the listing filters through the query string
#[tokio::test]
async fn test_list_questions_filters() {
    let TestApp { app, pool } = create_test_app();
    let alice = seed_user(&pool, "alice");
    let borrow = create_question(&app, alice, "Borrow checker", &["rust"]).await;
    create_question(&app, alice, "Event loop", &["javascript"]).await;

    let (_, page) = send(&app, "GET", "/questions?tagname=rust", None, None).await;
    assert_eq!(ids(&page), vec![borrow as i64]);

    let (_, page) = send(&app, "GET", "/questions?query=checker", None, None).await;
    assert_eq!(ids(&page), vec![borrow as i64]);

    let (_, page) = send(&app, "GET", "/questions?status=Pending&page=2", None, None).await;
    assert_eq!(page["items"], json!([]));
    assert_eq!(page["totalItems"], 2);
}

/// Tests that malformed listing parameters are rejected
#[tokio::test]
async fn test_list_questions_bad_input() {
    let TestApp { app, .. } = create_test_app();

    let (status, body) = send(&app, "GET", "/questions?limit=500", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("limit"));

    let (status, _) = send(&app, "GET", "/questions?page=0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/questions?period=Decade", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // An offset that does not fit in 64 bits
    let (status, body) = send(&app, "GET", "/questions?page=9223372036854775807&limit=200", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "page is out of range");
}

/// Tests the comment cap and the reactions visible to each caller
#[tokio::test]
async fn test_detail_comments_and_reactions() {
    let TestApp { app, pool } = create_test_app();
    let alice = seed_user(&pool, "alice");
    let bob = seed_user(&pool, "bob");
    let id = create_question(&app, alice, "Discuss", &[]).await;
    for i in 0..6 {
        seed_comment(&pool, id, bob, &format!("comment {}", i), i);
    }
    seed_reaction(&pool, id, bob, ReactionKind::Laugh);
    seed_reaction(&pool, id, alice, ReactionKind::Heart);

    let (_, anonymous) = send(&app, "GET", &format!("/questions/{}", id), None, None).await;
    assert_eq!(anonymous["_count"]["comments"], 6);
    let contents: Vec<&str> = anonymous["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["comment 1", "comment 2", "comment 3", "comment 4", "comment 5"]);
    assert_eq!(anonymous["comments"][0]["user"]["username"], "bob");
    assert!(anonymous["comments"][0].get("comment").is_none());
    assert_eq!(anonymous["userReactions"], json!([]));

    let (_, as_bob) = send(&app, "GET", &format!("/questions/{}", id), Some(bob), None).await;
    let reactions = as_bob["userReactions"].as_array().unwrap();
    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0]["reaction"], "Laugh");
    assert_eq!(reactions[0]["userId"], bob);
}

/// Tests updating a question and replacing its tags
#[tokio::test]
async fn test_upsert_updates_question() {
    let TestApp { app, pool } = create_test_app();
    let alice = seed_user(&pool, "alice");
    let id = create_question(&app, alice, "Draft", &["old"]).await;

    let (status, body) = send(
        &app,
        "POST",
        "/questions",
        Some(alice),
        Some(json!({ "id": id, "title": "Final", "content": "Done", "tags": [{ "name": "new" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": id, "title": "Final" }));

    let (_, detail) = send(&app, "GET", &format!("/questions/{}", id), None, None).await;
    assert_eq!(detail["title"], "Final");
    assert_eq!(detail["tags"].as_array().unwrap().len(), 1);
    assert_eq!(detail["tags"][0]["name"], "new");
}

/// Tests that a payload with only a title creates a question owned by the caller
#[tokio::test]
async fn test_upsert_title_only() {
    let TestApp { app, pool } = create_test_app();
    let user = seed_user_with_id(&pool, 42, "answer-seeker");

    let (status, body) = send(&app, "POST", "/questions", Some(user), Some(json!({ "title": "T" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "T");
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body, json!({ "id": id, "title": "T" }));

    let (_, detail) = send(&app, "GET", &format!("/questions/{}", id), None, None).await;
    assert_eq!(detail["user"]["id"], 42);
    assert_eq!(detail["content"], "");
    assert_eq!(detail["tags"], json!([]));
}

/// Tests that malformed bodies and paths get the JSON error body
#[tokio::test]
async fn test_malformed_requests_use_error_body() {
    let TestApp { app, pool } = create_test_app();
    let alice = seed_user(&pool, "alice");

    let (status, body) = send(&app, "POST", "/questions", Some(alice), Some(json!({ "content": "no title" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("title"));

    let request = Request::builder()
        .uri("/questions")
        .method("POST")
        .header("Content-Type", "application/json")
        .header(askboard::auth::USER_ID_HEADER, alice.to_string())
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "PUT", "/questions/abc/answer", Some(alice), Some(json!({ "answerId": null }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

/// Tests the error taxonomy of the write endpoints
#[tokio::test]
async fn test_write_errors() {
    let TestApp { app, pool } = create_test_app();
    let alice = seed_user(&pool, "alice");
    let id = create_question(&app, alice, "Target", &[]).await;

    // Upsert requires an identity
    let (status, body) = send(&app, "POST", "/questions", None, Some(json!({ "title": "x", "content": "y" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");

    // Malformed identity
    let request = Request::builder()
        .uri("/questions")
        .method("POST")
        .header("Content-Type", "application/json")
        .header(askboard::auth::USER_ID_HEADER, "alice")
        .body(Body::from(json!({ "title": "x", "content": "y" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Blank title
    let (status, _) = send(&app, "POST", "/questions", Some(alice), Some(json!({ "title": " ", "content": "y" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Updating a missing question
    let (status, body) = send(
        &app,
        "POST",
        "/questions",
        Some(alice),
        Some(json!({ "id": 9999, "title": "x", "content": "y" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Question not found");

    // Unknown tag id
    let (status, body) = send(
        &app,
        "POST",
        "/questions",
        Some(alice),
        Some(json!({ "title": "x", "content": "y", "tags": [{ "id": 9999, "name": "ghost" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Tag not found");

    // Deleting a missing question
    let (status, _) = send(&app, "DELETE", "/questions/9999", Some(alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Selecting an answer of another question
    let other = create_question(&app, alice, "Other", &[]).await;
    let foreign = seed_answer(&pool, other, alice);
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/questions/{}/answer", id),
        Some(alice),
        Some(json!({ "answerId": foreign })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Answer not found");

    // Non-numeric id in the path
    let (status, _) = send(&app, "GET", "/questions/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
