use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{error::AppResult, models::Movie, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
}

/// Handler for this week's trending movies
pub async fn trending(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.movies.trending().await?;
    Ok(Json(movies))
}

/// Handler for catalog search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.movies.search(params.query.as_deref()).await?;
    Ok(Json(movies))
}

/// Handler for a single movie's details
pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Movie>> {
    let movie = state.movies.details(&id).await?;
    Ok(Json(movie))
}
