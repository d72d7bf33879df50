use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::{extractors::AuthUser, jwt::JwtKeys};
use crate::error::ApiError;

/// Rejects requests without a valid bearer token; stores the token's email
/// in request extensions as an [`AuthUser`].
pub async fn require_bearer(
    State(keys): State<JwtKeys>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Token not found".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header".into()))?;

    let email = keys.extract_email(token).map_err(|e| {
        warn!(error = %e, "bearer token rejected");
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(AuthUser { email });
    Ok(next.run(request).await)
}
