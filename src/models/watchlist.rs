use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// A comment attached to a watchlist entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(text: String) -> Self {
        Self {
            text,
            created_at: Utc::now(),
        }
    }
}

/// A movie saved to one user's watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub title: String,
    pub poster_path: String,
    pub overview: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub genre_ids: Vec<i64>,
    pub loved: bool,
    pub rating: Option<i32>,
    pub comments: Vec<Comment>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Validated data for a new watchlist entry
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: Uuid,
    pub movie_id: i64,
    pub title: String,
    pub poster_path: String,
    pub overview: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub genre_ids: Vec<i64>,
}

/// Body of `POST /users/watchlist`
#[derive(Debug, Default, Deserialize)]
pub struct SaveMovieRequest {
    #[serde(rename = "movieId")]
    pub movie_id: Option<i64>,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

/// Raw query string of `GET /users/watchlist`; numbers are parsed leniently
#[derive(Debug, Default, Deserialize)]
pub struct WatchlistParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

/// Normalized page request handed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl From<WatchlistParams> for PageRequest {
    fn from(params: WatchlistParams) -> Self {
        Self {
            page: parse_positive(params.page.as_deref()).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(params.limit.as_deref()).unwrap_or(DEFAULT_LIMIT),
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1)
}

/// One page of a user's watchlist
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistPage {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u32,
    pub watchlist: Vec<WatchlistEntry>,
}

impl WatchlistPage {
    pub fn new(request: &PageRequest, total_items: u64, watchlist: Vec<WatchlistEntry>) -> Self {
        Self {
            current_page: request.page,
            total_pages: total_items.div_ceil(u64::from(request.limit.max(1))),
            total_items,
            items_per_page: request.limit,
            watchlist,
        }
    }
}

/// Response for entry mutations that echo the updated entry
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryMessage {
    pub message: String,
    pub movie: WatchlistEntry,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}
