use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Raised by the repository layer when the row an operation targets does not
/// exist
///
/// Repositories return it inside an `anyhow::Error`; [`db_call`] recognises it
/// and turns it into [`ApiError::NotFound`].
/// The payload names the missing entity (`"Question"`, `"Answer"`, `"Tag"`).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0} not found")]
pub struct RecordNotFound(pub &'static str);

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Authentication required")]
    Unauthorized,
}

impl ApiError {
    /// Classifies an error returned by a repository function
    pub fn from_service(err: anyhow::Error) -> Self {
        if let Some(&RecordNotFound(entity)) = err.downcast_ref::<RecordNotFound>() {
            ApiError::NotFound(entity)
        } else {
            ApiError::Database(err)
        }
    }
}

/// Awaits a repository call and normalizes its failure into an [`ApiError`]
pub async fn db_call<T, F>(op: F) -> Result<T, ApiError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    op.await.map_err(ApiError::from_service)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                error!("Database error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::NotFound(entity) => (StatusCode::NOT_FOUND, format!("{} not found", entity)),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required".to_string()),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
