/// Web API Handlers
///
/// This module contains the handlers for the question endpoints.
/// Each handler extracts its input, composes the selection the repository
/// should load, calls the repository, and reshapes the raw record into the
/// API object. Repository failures go through [`crate::errors::db_call`] so
/// every handler reports them the same way.

mod question_handlers;

// Re-export all handlers
pub use question_handlers::*;
