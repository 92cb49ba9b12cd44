use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{AuthResponse, LoginRequest, RegisterRequest},
    routes::AppState,
};

/// Handler for user registration
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let Json(request) = payload?;
    let response = state.authenticator.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for credential login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(request) = payload?;
    let response = state.authenticator.login(request).await?;
    Ok(Json(response))
}
