use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use recon_core::CoreError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFoundError(String),
    UnprocessableError(String),
    ConflictError(String),
    UpstreamError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UnprocessableError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UpstreamError(msg) => {
                tracing::error!("Upstream webhook error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

/// Machine transition failures surface as conflicts (something is mid-flight
/// or out of order), everything else as a plain 500.
pub fn machine_error(err: CoreError) -> AppError {
    match err {
        CoreError::InvalidTransition { .. } => AppError::ConflictError(err.to_string()),
        other => AppError::InternalServerError(other.to_string()),
    }
}

/// Session store failures are infrastructure trouble, not user input.
pub fn store_error(err: Box<dyn std::error::Error + Send + Sync>) -> AppError {
    AppError::InternalServerError(err.to_string())
}
