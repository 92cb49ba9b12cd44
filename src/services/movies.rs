use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Movie,
    services::{genres::GenreTable, providers::MovieCatalog},
};

/// Read-through access to the movie catalog with genre-name enrichment
#[derive(Clone)]
pub struct MovieService {
    catalog: Arc<dyn MovieCatalog>,
    genres: Arc<GenreTable>,
}

impl MovieService {
    pub fn new(catalog: Arc<dyn MovieCatalog>, genres: Arc<GenreTable>) -> Self {
        Self { catalog, genres }
    }

    pub async fn trending(&self) -> AppResult<Vec<Movie>> {
        let movies = self.catalog.trending().await?;
        Ok(self.enrich(movies))
    }

    pub async fn details(&self, id: &str) -> AppResult<Movie> {
        self.catalog.details(id).await
    }

    pub async fn search(&self, query: Option<&str>) -> AppResult<Vec<Movie>> {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Search query is required".to_string()))?;

        let movies = self.catalog.search(query).await?;
        Ok(self.enrich(movies))
    }

    /// Adds `genre_names` derived from each movie's `genre_ids`
    fn enrich(&self, movies: Vec<Movie>) -> Vec<Movie> {
        movies
            .into_iter()
            .map(|mut movie| {
                let ids = movie.genre_ids.as_deref().unwrap_or_default();
                movie.genre_names = Some(self.genres.names_for(ids));
                movie
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockMovieCatalog;
    use mockall::predicate::eq;
    use serde_json::Map;

    fn movie(id: i64, title: &str, genre_ids: Option<Vec<i64>>) -> Movie {
        Movie {
            id,
            title: Some(title.to_string()),
            overview: None,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            genre_ids,
            genre_names: None,
            extra: Map::new(),
        }
    }

    fn service(catalog: MockMovieCatalog) -> MovieService {
        MovieService::new(Arc::new(catalog), Arc::new(GenreTable::default()))
    }

    #[tokio::test]
    async fn test_trending_enriches_genres() {
        let mut catalog = MockMovieCatalog::new();
        catalog.expect_trending().times(1).returning(|| {
            Ok(vec![
                movie(27205, "Inception", Some(vec![28, 878])),
                movie(1, "No Genres", None),
            ])
        });

        let movies = service(catalog).trending().await.unwrap();
        assert_eq!(
            movies[0].genre_names,
            Some(vec!["Action".to_string(), "Science Fiction".to_string()])
        );
        assert_eq!(movies[1].genre_names, Some(vec![]));
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let mut catalog = MockMovieCatalog::new();
        catalog.expect_search().never();
        let service = service(catalog);

        for query in [None, Some(""), Some("   ")] {
            let result = service.search(query).await;
            assert!(matches!(result, Err(AppError::InvalidInput(_))));
        }
    }

    #[tokio::test]
    async fn test_search_passes_trimmed_query() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_search()
            .with(eq("superman"))
            .times(1)
            .returning(|_| Ok(vec![movie(1924, "Superman", Some(vec![12]))]));

        let movies = service(catalog).search(Some(" superman ")).await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].genre_names, Some(vec!["Adventure".to_string()]));
    }

    #[tokio::test]
    async fn test_details_passes_through_unenriched() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_details()
            .with(eq("27205"))
            .returning(|_| Ok(movie(27205, "Inception", None)));

        let movie = service(catalog).details("27205").await.unwrap();
        assert_eq!(movie.id, 27205);
        assert_eq!(movie.genre_names, None);
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_trending()
            .returning(|| Err(AppError::ExternalApi("TMDB API returned status 503".to_string())));

        let result = service(catalog).trending().await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
