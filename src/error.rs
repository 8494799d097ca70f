use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::domain::friendship::FriendshipError;
use crate::domain::interactions::InteractionError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not allowed: {0}")]
    Authorization(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Password hash error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Client errors answer with `{"Message": …}`, server failures with a
/// generic `{"Error": …}` body; details for the latter go to the log only.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "Message": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "Message": msg })),
            AppError::Authorization(msg) => {
                (StatusCode::METHOD_NOT_ALLOWED, json!({ "Message": msg }))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "Message": msg })),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "Message": "You haven't logged in or registered yet" }),
            ),
            AppError::Store(StoreError::DuplicateEmail) => (
                StatusCode::CONFLICT,
                json!({ "Message": "account already exists" }),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "Error": "the API failed" }),
                )
            }
            AppError::Bcrypt(e) => {
                tracing::error!("Password hash error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "Error": "the API failed" }),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "Error": "the API failed" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<FriendshipError> for AppError {
    fn from(err: FriendshipError) -> Self {
        AppError::Conflict(err.to_string())
    }
}

impl From<InteractionError> for AppError {
    fn from(err: InteractionError) -> Self {
        match err {
            InteractionError::NoFields | InteractionError::EmptyBody => {
                AppError::Validation(err.to_string())
            }
            InteractionError::CommentNotFound => AppError::NotFound(err.to_string()),
            InteractionError::NotOwner | InteractionError::NotAuthor => {
                AppError::Authorization(err.to_string())
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    #[test]
    fn validation_returns_400() {
        assert_eq!(
            response_status(AppError::Validation("identifier not valid".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(
            response_status(AppError::NotFound("account not found".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn authorization_returns_405() {
        assert_eq!(
            response_status(AppError::Authorization("not the owner".into())),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn conflict_returns_409() {
        assert_eq!(
            response_status(AppError::Conflict("already friends".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn unauthorized_returns_401() {
        assert_eq!(
            response_status(AppError::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn duplicate_email_returns_409() {
        assert_eq!(
            response_status(AppError::Store(StoreError::DuplicateEmail)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
