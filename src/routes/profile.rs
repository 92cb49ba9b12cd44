use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{AuthResponse, UpdateProfileRequest, UserPublic},
    routes::AppState,
};

/// Handler for `/auth/me` and `GET /users/profile`
///
/// The access guard has already re-read the user for this request, so both routes
/// return that identity.
pub async fn get_profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserPublic> {
    Json(user)
}

/// Handler for profile updates
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(request) = payload?;
    let response = state.profiles.update_profile(user.id, request).await?;
    Ok(Json(response))
}
