/// The Movie Database (TMDB) provider
///
/// API Flow:
/// 1. Trending: /trending/movie/week → paged results
/// 2. Details: /movie/{id} → single movie
/// 3. Search: /search/movie?query= → paged results
///
/// The API key travels as the `api_key` query parameter on every request.
use crate::{
    error::{AppError, AppResult},
    models::{Movie, TmdbPage},
    services::providers::MovieCatalog,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Issues one GET and decodes the body, treating any non-2xx as an upstream failure
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.url(path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::HttpClient(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(path, status = %status, body = %body, "TMDB error response");
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}",
                status
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| AppError::HttpClient(e.without_url()))?;

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                "Failed to deserialize TMDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn trending(&self) -> AppResult<Vec<Movie>> {
        let page: TmdbPage = self.get_json("/trending/movie/week", &[]).await?;

        tracing::info!(
            results = page.results.len(),
            provider = self.name(),
            "Trending movies fetched"
        );

        Ok(page.results)
    }

    async fn details(&self, id: &str) -> AppResult<Movie> {
        // Keep the id a single path segment
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(AppError::InvalidInput(format!("Invalid movie id: {}", id)));
        }

        let movie: Movie = self.get_json(&format!("/movie/{}", id), &[]).await?;

        tracing::info!(movie_id = movie.id, provider = self.name(), "Movie details fetched");

        Ok(movie)
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Movie>> {
        let page: TmdbPage = self
            .get_json("/search/movie", &[("query", query)])
            .await?;

        tracing::info!(
            query = %query,
            results = page.results.len(),
            provider = self.name(),
            "Movie search completed"
        );

        Ok(page.results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
