/// Movie catalog provider abstraction
///
/// The catalog is an external, read-only source of movie data. Handlers and
/// services only see this trait, so the HTTP client behind it can be swapped or
/// stubbed without touching request handling.
use crate::{error::AppResult, models::Movie};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

/// Trait for movie catalog providers
///
/// Each method maps to exactly one outbound request. Credentials are owned by the
/// provider and never taken from the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Movies trending this week
    async fn trending(&self) -> AppResult<Vec<Movie>>;

    /// Full details for one movie
    async fn details(&self, id: &str) -> AppResult<Movie>;

    /// Movies whose title matches `query`
    async fn search(&self, query: &str) -> AppResult<Vec<Movie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
