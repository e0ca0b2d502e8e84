use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// A single violated constraint on one input field, surfaced to the client
/// as `{field, message}`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Database(e) => {
                tracing::error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({"success": false, "message": "Internal server error"}),
                )
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({"success": false, "errors": errors}),
            ),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({"success": false, "message": message}),
            ),
            AppError::InvalidBody(rejection) => {
                let message = rejection.body_text();
                (
                    rejection.status(),
                    serde_json::json!({"success": false, "message": message}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

/// `axum::Json` with the rejection mapped through [`AppError`], so a
/// malformed or missing body gets the same `{success:false, message}`
/// envelope as every other failure.
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}
