use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    db::{UserRepository, WatchlistRepository},
    middleware::{make_span_with_request_id, request_id_middleware, require_auth},
    services::{
        Authenticator, GenreTable, MovieCatalog, MovieService, PasswordHasher, ProfileService,
        TokenIssuer, WatchlistService,
    },
};

pub mod auth;
pub mod movies;
pub mod profile;
pub mod watchlist;

/// Shared application state
pub struct AppState {
    pub authenticator: Authenticator,
    pub profiles: ProfileService,
    pub watchlist: WatchlistService,
    pub movies: MovieService,
    pub cors_origin: Option<HeaderValue>,
}

impl AppState {
    /// Wires services from configuration and the chosen store and catalog
    pub fn new(
        config: &Config,
        users: Arc<dyn UserRepository>,
        entries: Arc<dyn WatchlistRepository>,
        catalog: Arc<dyn MovieCatalog>,
        genres: GenreTable,
    ) -> Self {
        let tokens = TokenIssuer::from_config(config);
        let hasher = PasswordHasher::new(config.password_hash_cost);

        let cors_origin = match HeaderValue::from_str(&config.cors_origin) {
            Ok(origin) => Some(origin),
            Err(e) => {
                tracing::warn!(origin = %config.cors_origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        };

        Self {
            authenticator: Authenticator::new(users.clone(), tokens.clone(), hasher),
            profiles: ProfileService::new(users, tokens, hasher),
            watchlist: WatchlistService::new(entries),
            movies: MovieService::new(catalog, Arc::new(genres)),
            cors_origin,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);
    if let Some(origin) = state.cors_origin.clone() {
        cors = cors.allow_origin(origin);
    }

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors),
        )
        .with_state(state)
}

/// API routes under /api
fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/movies/trending", get(movies::trending))
        .route("/movies/search", get(movies::search))
        .route("/movies/:id", get(movies::details));

    let protected = Router::new()
        .route("/auth/me", get(profile::get_profile))
        .route(
            "/users/watchlist",
            get(watchlist::list).post(watchlist::save),
        )
        .route("/users/watchlist/loved", get(watchlist::loved))
        .route("/users/watchlist/:movie_id", delete(watchlist::remove))
        .route("/users/watchlist/:movie_id/love", patch(watchlist::love))
        .route("/users/watchlist/:movie_id/rate", patch(watchlist::rate))
        .route("/users/watchlist/:movie_id/comment", post(watchlist::comment))
        .route(
            "/users/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(protected)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
