use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::api::AppState;
use crate::error::AppError;
use crate::models::User;

/// Authenticated caller, resolved from the `Authorization: Bearer` token
///
/// Absent, malformed, or unknown tokens reject uniformly with
/// `Unauthorized`; handlers taking this extractor never see an anonymous
/// request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

        let user = state
            .accounts
            .authenticate(token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(AuthUser(user))
    }
}
