use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Gate for mutating routes: a non-empty `Authorization: Bearer …`
/// header must be present. The token itself is never inspected.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth;

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let token = header.strip_prefix("Bearer ").unwrap_or("").trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        Ok(RequireAuth)
    }
}
