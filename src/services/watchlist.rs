use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::WatchlistRepository,
    error::{AppError, AppResult},
    models::{Comment, NewEntry, PageRequest, SaveMovieRequest, WatchlistEntry, WatchlistPage},
    services::auth::non_empty,
};

const ENTRY_NOT_FOUND: &str = "Movie not found in your watchlist";

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

fn not_found() -> AppError {
    AppError::NotFound(ENTRY_NOT_FOUND.to_string())
}

/// Parses the `:movieId` path segment
pub fn parse_movie_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::InvalidInput(format!("Invalid movie id: {}", raw)))
}

/// Watchlist operations, always scoped to the authenticated user
///
/// `user_id` comes from the access guard, never from the request body, so a
/// caller can only see or change their own entries.
#[derive(Clone)]
pub struct WatchlistService {
    entries: Arc<dyn WatchlistRepository>,
}

impl WatchlistService {
    pub fn new(entries: Arc<dyn WatchlistRepository>) -> Self {
        Self { entries }
    }

    /// Saves a movie; the store's uniqueness constraint rejects duplicates
    pub async fn save(&self, user_id: Uuid, request: SaveMovieRequest) -> AppResult<WatchlistEntry> {
        let (Some(movie_id), Some(title), Some(poster_path)) = (
            request.movie_id.filter(|id| *id > 0),
            non_empty(request.title),
            non_empty(request.poster_path),
        ) else {
            return Err(AppError::InvalidInput("Missing movie data".to_string()));
        };

        let entry = self
            .entries
            .insert_entry(NewEntry {
                user_id,
                movie_id,
                title,
                poster_path,
                overview: request.overview,
                backdrop_path: request.backdrop_path,
                release_date: request.release_date,
                genre_ids: request.genre_ids,
            })
            .await?;

        tracing::info!(user_id = %user_id, movie_id, "Movie saved to watchlist");
        Ok(entry)
    }

    /// Marks an entry as loved; repeating the call is a no-op
    pub async fn love(&self, user_id: Uuid, movie_id: i64) -> AppResult<WatchlistEntry> {
        self.entries
            .set_loved(user_id, movie_id)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn remove(&self, user_id: Uuid, movie_id: i64) -> AppResult<()> {
        if !self.entries.delete_entry(user_id, movie_id).await? {
            return Err(not_found());
        }

        tracing::info!(user_id = %user_id, movie_id, "Movie removed from watchlist");
        Ok(())
    }

    /// Sets the rating, replacing any earlier one
    pub async fn rate(
        &self,
        user_id: Uuid,
        movie_id: i64,
        rating: Option<i64>,
    ) -> AppResult<WatchlistEntry> {
        let rating = rating
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .ok_or_else(|| {
                AppError::InvalidInput("Rating must be between 1 and 5".to_string())
            })?;

        self.entries
            .set_rating(user_id, movie_id, rating as i32)
            .await?
            .ok_or_else(not_found)
    }

    /// Appends a timestamped comment
    pub async fn comment(
        &self,
        user_id: Uuid,
        movie_id: i64,
        text: Option<String>,
    ) -> AppResult<WatchlistEntry> {
        let text = non_empty(text)
            .ok_or_else(|| AppError::InvalidInput("Comment text is required".to_string()))?;

        self.entries
            .push_comment(user_id, movie_id, Comment::new(text))
            .await?
            .ok_or_else(not_found)
    }

    pub async fn list(&self, user_id: Uuid, request: PageRequest) -> AppResult<WatchlistPage> {
        let (entries, total) = self.entries.list_entries(user_id, &request).await?;

        tracing::debug!(
            user_id = %user_id,
            page = request.page,
            limit = request.limit,
            total,
            "Watchlist page loaded"
        );

        Ok(WatchlistPage::new(&request, total, entries))
    }

    pub async fn loved(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        self.entries.list_loved(user_id).await
    }
}
