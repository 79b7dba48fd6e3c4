/// Repository module
///
/// This module provides the data access layer for the application. Handlers
/// describe what they need with a selection struct and receive raw records, still
/// carrying their join wrappers, which they reshape for the API.
///
/// Every function returns `anyhow::Result`; a missing target row is reported as
/// [`crate::errors::RecordNotFound`] so callers can tell it apart from a
/// database failure.

mod question_repo;
mod rank_repo;

// Re-export all repository functions
pub use question_repo::*;
pub use rank_repo::*;
