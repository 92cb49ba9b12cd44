use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::UserPublic,
    routes::AppState,
};

pub const NO_TOKEN: &str = "Not authorized, no token";
pub const TOKEN_FAILED: &str = "Not authorized, token failed";

/// The authenticated caller, attached to request extensions by [`require_auth`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserPublic);

/// Outcome of reading the `Authorization` header
#[derive(Debug, PartialEq, Eq)]
enum BearerToken<'a> {
    /// No `Bearer` authorization header at all
    Absent,
    /// A `Bearer` header whose token is missing or unreadable
    Malformed,
    Present(&'a str),
}

fn bearer_token(headers: &HeaderMap) -> BearerToken<'_> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return BearerToken::Absent;
    };

    let Ok(value) = value.to_str() else {
        return BearerToken::Malformed;
    };

    if !value.starts_with("Bearer") {
        return BearerToken::Absent;
    }

    match value.split_whitespace().nth(1) {
        Some(token) if value.starts_with("Bearer ") => BearerToken::Present(token),
        _ => BearerToken::Malformed,
    }
}

/// Access guard for protected routes
///
/// Rejects with 401 when the bearer token is missing or fails verification.
/// On success the caller's public profile is attached as [`CurrentUser`]; a
/// token whose user has since disappeared yields 404.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = match bearer_token(request.headers()) {
        BearerToken::Absent => return Err(AppError::Unauthorized(NO_TOKEN.to_string())),
        BearerToken::Malformed => return Err(AppError::Unauthorized(TOKEN_FAILED.to_string())),
        BearerToken::Present(token) => token,
    };

    let user_id = state
        .authenticator
        .verify(token)
        .map_err(|_| AppError::Unauthorized(TOKEN_FAILED.to_string()))?;

    let user = state.profiles.get_profile(user_id).await?;

    tracing::Span::current().record("user_id", tracing::field::display(user.id));
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
