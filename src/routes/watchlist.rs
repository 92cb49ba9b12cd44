use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::{CurrentUser, RequestId},
    models::{
        CommentRequest, EntryMessage, Message, PageRequest, RateRequest, SaveMovieRequest,
        WatchlistEntry, WatchlistPage, WatchlistParams,
    },
    routes::AppState,
    services::watchlist::parse_movie_id,
};

fn entry_message(message: &str, movie: WatchlistEntry) -> Json<EntryMessage> {
    Json(EntryMessage {
        message: message.to_string(),
        movie,
    })
}

/// Handler for saving a movie to the caller's watchlist
pub async fn save(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<SaveMovieRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<WatchlistEntry>)> {
    let Json(request) = payload?;

    tracing::debug!(
        request_id = %request_id,
        movie_id = ?request.movie_id,
        "Processing save request"
    );

    let entry = state.watchlist.save(user.id, request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Handler for marking a movie as loved
pub async fn love(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<EntryMessage>> {
    let movie_id = parse_movie_id(&movie_id)?;
    let entry = state.watchlist.love(user.id, movie_id).await?;
    Ok(entry_message("Movie marked as loved", entry))
}

/// Handler for removing a movie
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<Message>> {
    let movie_id = parse_movie_id(&movie_id)?;
    state.watchlist.remove(user.id, movie_id).await?;
    Ok(Json(Message {
        message: "Movie removed from watchlist".to_string(),
    }))
}

/// Handler for rating a movie
pub async fn rate(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(movie_id): Path<String>,
    payload: Result<Json<RateRequest>, JsonRejection>,
) -> AppResult<Json<EntryMessage>> {
    let movie_id = parse_movie_id(&movie_id)?;
    let Json(request) = payload?;
    let entry = state.watchlist.rate(user.id, movie_id, request.rating).await?;
    Ok(entry_message("Movie rated successfully", entry))
}

/// Handler for commenting on a movie
pub async fn comment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(movie_id): Path<String>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> AppResult<Json<EntryMessage>> {
    let movie_id = parse_movie_id(&movie_id)?;
    let Json(request) = payload?;
    let entry = state.watchlist.comment(user.id, movie_id, request.text).await?;
    Ok(entry_message("Comment added", entry))
}

/// Handler for the paginated, searchable watchlist
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<WatchlistParams>,
) -> AppResult<Json<WatchlistPage>> {
    let page = state.watchlist.list(user.id, PageRequest::from(params)).await?;
    Ok(Json(page))
}

/// Handler for loved movies
pub async fn loved(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<Vec<WatchlistEntry>>> {
    let entries = state.watchlist.loved(user.id).await?;
    Ok(Json(entries))
}
