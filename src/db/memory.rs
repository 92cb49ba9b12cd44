use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::{UserRepository, WatchlistRepository, DUPLICATE_EMAIL, DUPLICATE_ENTRY},
    error::{AppError, AppResult},
    models::{Comment, NewEntry, NewUser, PageRequest, User, WatchlistEntry},
};

/// In-process store with the same uniqueness guarantees as the PostgreSQL schema
///
/// Each check-and-write happens under a single write lock, which plays the role of
/// the unique indexes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    users: Vec<User>,
    /// Kept in insertion order
    entries: Vec<WatchlistEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStoreInner {
    fn entry_mut(&mut self, user_id: Uuid, movie_id: i64) -> Option<&mut WatchlistEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.user_id == user_id && e.movie_id == movie_id)
    }

    /// A user's entries, newest first; ties keep the later insert first
    fn entries_for(&self, user_id: Uuid) -> Vec<&WatchlistEntry> {
        let mut entries: Vec<&WatchlistEntry> = self
            .entries
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;

        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_user(&self, user: &User) -> AppResult<Option<User>> {
        let mut inner = self.inner.write().await;

        if inner
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let Some(stored) = inner.users.iter_mut().find(|u| u.id == user.id) else {
            return Ok(None);
        };

        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.updated_at = Utc::now();

        Ok(Some(stored.clone()))
    }
}

#[async_trait::async_trait]
impl WatchlistRepository for MemoryStore {
    async fn insert_entry(&self, entry: NewEntry) -> AppResult<WatchlistEntry> {
        let mut inner = self.inner.write().await;

        if inner.entry_mut(entry.user_id, entry.movie_id).is_some() {
            return Err(AppError::Conflict(DUPLICATE_ENTRY.to_string()));
        }

        let now = Utc::now();
        let entry = WatchlistEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            movie_id: entry.movie_id,
            title: entry.title,
            poster_path: entry.poster_path,
            overview: entry.overview,
            backdrop_path: entry.backdrop_path,
            release_date: entry.release_date,
            genre_ids: entry.genre_ids,
            loved: false,
            rating: None,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.entries.push(entry.clone());

        Ok(entry)
    }

    async fn set_loved(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<WatchlistEntry>> {
        let mut inner = self.inner.write().await;

        Ok(inner.entry_mut(user_id, movie_id).map(|entry| {
            entry.loved = true;
            entry.updated_at = Utc::now();
            entry.clone()
        }))
    }

    async fn set_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        rating: i32,
    ) -> AppResult<Option<WatchlistEntry>> {
        let mut inner = self.inner.write().await;

        Ok(inner.entry_mut(user_id, movie_id).map(|entry| {
            entry.rating = Some(rating);
            entry.updated_at = Utc::now();
            entry.clone()
        }))
    }

    async fn push_comment(
        &self,
        user_id: Uuid,
        movie_id: i64,
        comment: Comment,
    ) -> AppResult<Option<WatchlistEntry>> {
        let mut inner = self.inner.write().await;

        Ok(inner.entry_mut(user_id, movie_id).map(|entry| {
            entry.comments.push(comment);
            entry.updated_at = Utc::now();
            entry.clone()
        }))
    }

    async fn delete_entry(&self, user_id: Uuid, movie_id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;

        let position = inner
            .entries
            .iter()
            .position(|e| e.user_id == user_id && e.movie_id == movie_id);

        match position {
            Some(index) => {
                inner.entries.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_entries(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<(Vec<WatchlistEntry>, u64)> {
        let inner = self.inner.read().await;
        let needle = page.search.as_ref().map(|s| s.to_lowercase());

        let matching: Vec<&WatchlistEntry> = inner
            .entries_for(user_id)
            .into_iter()
            .filter(|e| match &needle {
                Some(needle) => e.title.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .collect();

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn list_loved(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let inner = self.inner.read().await;

        Ok(inner
            .entries_for(user_id)
            .into_iter()
            .filter(|e| e.loved)
            .cloned()
            .collect())
    }
}
