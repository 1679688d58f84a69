use crate::services::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = self.0.downcast_ref::<StoreError>() {
            let status = match err {
                StoreError::InvalidPath(_) | StoreError::InvalidName(_) => StatusCode::BAD_REQUEST,
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::AlreadyExists(_) => StatusCode::CONFLICT,
                StoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status.is_client_error() {
                tracing::debug!("Rejected request: {}", err);
                return (status, status.canonical_reason().unwrap_or("Error")).into_response();
            }
        }

        tracing::error!("Application error: {:?}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
