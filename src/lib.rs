/// Askboard: question endpoints of a Q&A forum
///
/// This library provides listing, detail, upsert, deletion and answer
/// selection for forum questions, backed by SQLite.
///
/// ### Modules
///
/// - `auth`: Caller identity extractors
/// - `config`: Layered configuration (defaults, file, environment, CLI)
/// - `db`: Connection pool, migrations and busy-retry helpers
/// - `dto`: Request inputs and response shapes
/// - `errors`: The API error type and its HTTP mapping
/// - `extract`: Json, path and query extractors with JSON error bodies
/// - `handlers`: HTTP handlers
/// - `models`: Data structures mapped to database rows
/// - `repo`: Repository layer for database operations
/// - `schema`: Database schema definitions
/// - `selectors`: Shared user and comment projections
///
/// ### Web API
///
/// - `GET /questions`: List questions, paginated and filtered
/// - `POST /questions`: Create or update a question
/// - `GET /questions/{id}`: Get a question with its relations
/// - `DELETE /questions/{id}`: Delete a question
/// - `PUT /questions/{id}/answer`: Select or clear the accepted answer

/// Caller identity module
pub mod auth;

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Data transfer objects module
pub mod dto;

/// Error types module
pub mod errors;

/// Extractors rejecting with the API error body
pub mod extract;

/// Request handlers module
pub mod handlers;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Projection presets module
pub mod selectors;

#[cfg(test)]
mod test_utils;

use axum::{
    Router,
    routing::{get, post, put},
};
use handlers::*;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Creates the application router
///
/// ### Arguments
///
/// * `pool` - The database connection pool shared by every handler
///
/// ### Returns
///
/// An Axum Router with all question routes
pub fn create_app(pool: Arc<db::DbPool>) -> Router {
    Router::new()
        // Route for listing questions and upserting one
        .route("/questions", get(get_questions_handler).post(upsert_question_handler))
        // Route for a single question
        .route("/questions/{id}", get(get_question_detail_handler).delete(delete_question_handler))
        // Route for selecting the accepted answer
        .route("/questions/{id}/answer", put(set_question_answer_handler))
        .layer(CorsLayer::permissive())
        // Add the database pool to the application state
        .with_state(pool)
}
