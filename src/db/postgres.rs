use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    db::{UserRepository, WatchlistRepository, DUPLICATE_EMAIL, DUPLICATE_ENTRY},
    error::{AppError, AppResult},
    models::{Comment, NewEntry, NewUser, PageRequest, User, WatchlistEntry},
};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

const ENTRY_COLUMNS: &str = "id, user_id, movie_id, title, poster_path, overview, \
     backdrop_path, release_date, genre_ids, loved, rating, comments, created_at, updated_at";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Translates a unique-index violation into a conflict, anything else into a database error
fn map_unique_violation(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// Builds an ILIKE pattern matching `search` literally anywhere in the title
fn title_pattern(search: Option<&str>) -> String {
    match search {
        Some(term) => {
            let escaped = term
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        }
        None => "%".to_string(),
    }
}

#[derive(Debug, FromRow)]
struct EntryRow {
    id: Uuid,
    user_id: Uuid,
    movie_id: i64,
    title: String,
    poster_path: String,
    overview: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    genre_ids: Vec<i64>,
    loved: bool,
    rating: Option<i32>,
    comments: Json<Vec<Comment>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EntryRow> for WatchlistEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            movie_id: row.movie_id,
            title: row.title,
            poster_path: row.poster_path,
            overview: row.overview,
            backdrop_path: row.backdrop_path,
            release_date: row.release_date,
            genre_ids: row.genre_ids,
            loved: row.loved,
            rating: row.rating,
            comments: row.comments.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, DUPLICATE_EMAIL))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn update_user(&self, user: &User) -> AppResult<Option<User>> {
        let query = format!(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, updated_at = now() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, DUPLICATE_EMAIL))
    }
}

#[async_trait::async_trait]
impl WatchlistRepository for PgStore {
    async fn insert_entry(&self, entry: NewEntry) -> AppResult<WatchlistEntry> {
        let query = format!(
            "INSERT INTO watchlist_entries \
             (id, user_id, movie_id, title, poster_path, overview, backdrop_path, release_date, genre_ids) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            ENTRY_COLUMNS
        );

        let row = sqlx::query_as::<_, EntryRow>(&query)
            .bind(Uuid::new_v4())
            .bind(entry.user_id)
            .bind(entry.movie_id)
            .bind(&entry.title)
            .bind(&entry.poster_path)
            .bind(&entry.overview)
            .bind(&entry.backdrop_path)
            .bind(&entry.release_date)
            .bind(&entry.genre_ids)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, DUPLICATE_ENTRY))?;

        Ok(row.into())
    }

    async fn set_loved(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<WatchlistEntry>> {
        let query = format!(
            "UPDATE watchlist_entries SET loved = TRUE, updated_at = now() \
             WHERE user_id = $1 AND movie_id = $2 RETURNING {}",
            ENTRY_COLUMNS
        );

        let row = sqlx::query_as::<_, EntryRow>(&query)
            .bind(user_id)
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(WatchlistEntry::from))
    }

    async fn set_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        rating: i32,
    ) -> AppResult<Option<WatchlistEntry>> {
        let query = format!(
            "UPDATE watchlist_entries SET rating = $3, updated_at = now() \
             WHERE user_id = $1 AND movie_id = $2 RETURNING {}",
            ENTRY_COLUMNS
        );

        let row = sqlx::query_as::<_, EntryRow>(&query)
            .bind(user_id)
            .bind(movie_id)
            .bind(rating)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(WatchlistEntry::from))
    }

    async fn push_comment(
        &self,
        user_id: Uuid,
        movie_id: i64,
        comment: Comment,
    ) -> AppResult<Option<WatchlistEntry>> {
        // jsonb `||` appends the new comment to the existing array
        let query = format!(
            "UPDATE watchlist_entries SET comments = comments || $3, updated_at = now() \
             WHERE user_id = $1 AND movie_id = $2 RETURNING {}",
            ENTRY_COLUMNS
        );

        let row = sqlx::query_as::<_, EntryRow>(&query)
            .bind(user_id)
            .bind(movie_id)
            .bind(Json(vec![comment]))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(WatchlistEntry::from))
    }

    async fn delete_entry(&self, user_id: Uuid, movie_id: i64) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM watchlist_entries WHERE user_id = $1 AND movie_id = $2")
                .bind(user_id)
                .bind(movie_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_entries(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<(Vec<WatchlistEntry>, u64)> {
        let pattern = title_pattern(page.search.as_deref());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM watchlist_entries \
             WHERE user_id = $1 AND title ILIKE $2 ESCAPE '\\'",
        )
        .bind(user_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            "SELECT {} FROM watchlist_entries \
             WHERE user_id = $1 AND title ILIKE $2 ESCAPE '\\' \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
            ENTRY_COLUMNS
        );

        let rows = sqlx::query_as::<_, EntryRow>(&query)
            .bind(user_id)
            .bind(&pattern)
            .bind(i64::from(page.limit))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok((
            rows.into_iter().map(WatchlistEntry::from).collect(),
            total.max(0) as u64,
        ))
    }

    async fn list_loved(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let query = format!(
            "SELECT {} FROM watchlist_entries WHERE user_id = $1 AND loved \
             ORDER BY created_at DESC, id DESC",
            ENTRY_COLUMNS
        );

        let rows = sqlx::query_as::<_, EntryRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(WatchlistEntry::from).collect())
    }
}
