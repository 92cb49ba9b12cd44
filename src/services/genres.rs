use std::collections::HashMap;
use std::path::Path;

use crate::models::TmdbGenreList;

/// TMDB's published movie genre list
///
/// The catalog only returns genre ids in list responses, so names come from this
/// table. TMDB may add genres at any time; deployments can replace the table with
/// a fresh `/genre/movie/list` dump via `GENRE_TABLE_PATH`.
const TMDB_MOVIE_GENRES: &[(i64, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

/// Genre id → name lookup used to enrich catalog results
#[derive(Debug, Clone)]
pub struct GenreTable {
    names: HashMap<i64, String>,
}

impl Default for GenreTable {
    fn default() -> Self {
        Self::from_pairs(
            TMDB_MOVIE_GENRES
                .iter()
                .map(|(id, name)| (*id, name.to_string())),
        )
    }
}

impl GenreTable {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i64, String)>) -> Self {
        Self {
            names: pairs.into_iter().collect(),
        }
    }

    /// Parses a table in TMDB's `{"genres": [{"id": .., "name": ..}]}` shape
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let list: TmdbGenreList = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("Invalid genre table: {}", e))?;

        Ok(Self::from_pairs(
            list.genres.into_iter().map(|genre| (genre.id, genre.name)),
        ))
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read genre table {}: {}", path.display(), e))?;
        Self::from_json(&json)
    }

    /// Loads the configured table, falling back to the built-in one
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let table = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        tracing::info!(
            genres = table.len(),
            source = path.unwrap_or("built-in"),
            "Loaded genre table"
        );

        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Maps ids to names in order, dropping ids the table does not know
    pub fn names_for(&self, ids: &[i64]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| match self.names.get(id) {
                Some(name) => Some(name.clone()),
                None => {
                    tracing::warn!(genre_id = id, "Unknown genre id - genre table may be stale");
                    None
                }
            })
            .collect()
    }
}
