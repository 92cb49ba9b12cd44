//! Persistence for users and watchlists
//!
//! Services depend only on the repository traits below. Two backends implement
//! them: PostgreSQL for deployments and an in-process store for tests and local
//! runs. Both enforce email uniqueness and (user, movie) uniqueness themselves and
//! report a violation as [`AppError::Conflict`](crate::error::AppError::Conflict).

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Comment, NewEntry, NewUser, PageRequest, User, WatchlistEntry},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PgStore};

pub const DUPLICATE_EMAIL: &str = "User already exists";
pub const DUPLICATE_ENTRY: &str = "Movie already saved";

/// Credential store
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user, failing with a conflict if the email is taken
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Persists name, email and password hash of an existing user
    ///
    /// Returns `None` if the user no longer exists.
    async fn update_user(&self, user: &User) -> AppResult<Option<User>>;
}

/// Per-user watchlist store
///
/// Every method is scoped by `user_id`; an entry owned by another user is
/// indistinguishable from a missing one.
#[async_trait::async_trait]
pub trait WatchlistRepository: Send + Sync {
    /// Inserts an entry, failing with a conflict if (user, movie) already exists
    async fn insert_entry(&self, entry: NewEntry) -> AppResult<WatchlistEntry>;

    async fn set_loved(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<WatchlistEntry>>;

    async fn set_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        rating: i32,
    ) -> AppResult<Option<WatchlistEntry>>;

    async fn push_comment(
        &self,
        user_id: Uuid,
        movie_id: i64,
        comment: Comment,
    ) -> AppResult<Option<WatchlistEntry>>;

    /// Deletes one entry, returning whether it existed
    async fn delete_entry(&self, user_id: Uuid, movie_id: i64) -> AppResult<bool>;

    /// Returns the requested page, newest first, along with the total match count
    async fn list_entries(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<(Vec<WatchlistEntry>, u64)>;

    async fn list_loved(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>>;
}
