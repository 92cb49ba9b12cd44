use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use watchlist_api::{
    config::Config,
    create_router,
    db::MemoryStore,
    error::{AppError, AppResult},
    models::Movie,
    services::{GenreTable, MovieCatalog, TmdbCatalog, TokenIssuer},
    AppState,
};

/// Catalog double returning canned movies without network access
struct StubCatalog;

fn stub_movie(id: i64, title: &str, genre_ids: &[i64]) -> Movie {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "poster_path": format!("/{}.jpg", id),
        "genre_ids": genre_ids,
        "vote_average": 8.1
    }))
    .unwrap()
}

#[async_trait::async_trait]
impl MovieCatalog for StubCatalog {
    async fn trending(&self) -> AppResult<Vec<Movie>> {
        Ok(vec![
            stub_movie(27205, "Inception", &[28, 878]),
            stub_movie(155, "The Dark Knight", &[18, 28]),
        ])
    }

    async fn details(&self, id: &str) -> AppResult<Movie> {
        match id {
            "27205" => Ok(stub_movie(27205, "Inception", &[28, 878])),
            _ => Err(AppError::ExternalApi(
                "TMDB API returned status 404 Not Found".to_string(),
            )),
        }
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Movie>> {
        Ok(vec![stub_movie(1924, &format!("{} (1978)", query), &[12, 999])])
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn test_config() -> Config {
    Config::from_vars(vec![
        ("JWT_SECRET".to_string(), "integration-secret".to_string()),
        ("TMDB_API_KEY".to_string(), "unused".to_string()),
        ("STORAGE_BACKEND".to_string(), "memory".to_string()),
        ("PASSWORD_HASH_COST".to_string(), "4".to_string()),
    ])
    .unwrap()
}

fn create_test_server() -> TestServer {
    create_test_server_with_catalog(Arc::new(StubCatalog))
}

fn create_test_server_with_catalog(catalog: Arc<dyn MovieCatalog>) -> TestServer {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        &test_config(),
        store.clone(),
        store,
        catalog,
        GenreTable::default(),
    );
    let app = create_router(Arc::new(state));
    TestServer::new(app).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

async fn register(server: &TestServer, name: &str, email: &str, password: &str) -> Value {
    let response = server
        .post("/api/auth/register")
        .json(&json!({ "name": name, "email": email, "password": password }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn save_movie(server: &TestServer, token: &str, movie_id: i64, title: &str) -> StatusCode {
    server
        .post("/api/users/watchlist")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({
            "movieId": movie_id,
            "title": title,
            "poster_path": format!("/{}.jpg", movie_id)
        }))
        .await
        .status_code()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_register_and_login() {
    let server = create_test_server();

    let registered = register(&server, "A", "a@b.com", "pw").await;
    assert_eq!(registered["name"], "A");
    assert_eq!(registered["email"], "a@b.com");
    assert!(registered["token"].is_string());
    assert!(registered.get("password").is_none());

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "a@b.com", "password": "pw" }))
        .await;
    response.assert_status_ok();
    let logged_in: Value = response.json();
    assert_eq!(logged_in["id"], registered["id"]);

    let token = logged_in["token"].as_str().unwrap();
    let response = server
        .get("/api/auth/me")
        .add_header(header::AUTHORIZATION, bearer(token))
        .await;
    response.assert_status_ok();
    let me: Value = response.json();
    assert_eq!(me["id"], registered["id"]);
    assert!(me.get("passwordHash").is_none());
    assert!(me.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let server = create_test_server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": "a@b.com", "password": "pw" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    register(&server, "A", "a@b.com", "pw").await;
    let response = server
        .post("/api/auth/register")
        .json(&json!({ "name": "B", "email": "a@b.com", "password": "pw2" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let server = create_test_server();
    register(&server, "A", "a@b.com", "pw").await;

    let wrong_password = server
        .post("/api/auth/login")
        .json(&json!({ "email": "a@b.com", "password": "wrong" }))
        .await;
    let unknown_user = server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@b.com", "password": "pw" }))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_user.assert_status(StatusCode::UNAUTHORIZED);
    let a: Value = wrong_password.json();
    let b: Value = unknown_user.json();
    assert_eq!(a, b);
    assert_eq!(a["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_guard_messages() {
    let server = create_test_server();

    let response = server.get("/api/users/watchlist").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Not authorized, no token");

    let response = server
        .get("/api/users/watchlist")
        .add_header(header::AUTHORIZATION, bearer("garbage"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Not authorized, token failed");
}

#[tokio::test]
async fn test_save_duplicate_conflicts() {
    let server = create_test_server();
    let user = register(&server, "A", "a@b.com", "pw").await;
    let token = user["token"].as_str().unwrap();

    assert_eq!(save_movie(&server, token, 27205, "Inception").await, StatusCode::CREATED);
    assert_eq!(save_movie(&server, token, 27205, "Inception").await, StatusCode::CONFLICT);

    let response = server
        .get("/api/users/watchlist")
        .add_header(header::AUTHORIZATION, bearer(token))
        .await;
    let page: Value = response.json();
    assert_eq!(page["totalItems"], 1);
}

#[tokio::test]
async fn test_save_missing_data_rejected() {
    let server = create_test_server();
    let user = register(&server, "A", "a@b.com", "pw").await;
    let token = user["token"].as_str().unwrap();

    let response = server
        .post("/api/users/watchlist")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({ "movieId": 1, "title": "Heat" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing movie data");
}

#[tokio::test]
async fn test_love_rate_comment_flow() {
    let server = create_test_server();
    let user = register(&server, "A", "a@b.com", "pw").await;
    let token = user["token"].as_str().unwrap();
    save_movie(&server, token, 27205, "Inception").await;

    for _ in 0..2 {
        let response = server
            .patch("/api/users/watchlist/27205/love")
            .add_header(header::AUTHORIZATION, bearer(token))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["movie"]["loved"], true);
    }

    for rating in [0, 6] {
        server
            .patch("/api/users/watchlist/27205/rate")
            .add_header(header::AUTHORIZATION, bearer(token))
            .json(&json!({ "rating": rating }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    for rating in [3, 5] {
        server
            .patch("/api/users/watchlist/27205/rate")
            .add_header(header::AUTHORIZATION, bearer(token))
            .json(&json!({ "rating": rating }))
            .await
            .assert_status_ok();
    }

    let response = server
        .post("/api/users/watchlist/27205/comment")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({ "text": "Dream within a dream" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Comment added");
    assert_eq!(body["movie"]["rating"], 5);
    assert_eq!(body["movie"]["comments"][0]["text"], "Dream within a dream");

    let response = server
        .get("/api/users/watchlist/loved")
        .add_header(header::AUTHORIZATION, bearer(token))
        .await;
    let loved: Vec<Value> = response.json();
    assert_eq!(loved.len(), 1);
    assert_eq!(loved[0]["movieId"], 27205);
}

#[tokio::test]
async fn test_other_users_entries_are_hidden() {
    let server = create_test_server();
    let owner = register(&server, "Owner", "owner@b.com", "pw").await;
    let intruder = register(&server, "Intruder", "intruder@b.com", "pw").await;
    let owner_token = owner["token"].as_str().unwrap();
    let intruder_token = intruder["token"].as_str().unwrap();

    save_movie(&server, owner_token, 603, "The Matrix").await;

    server
        .patch("/api/users/watchlist/603/love")
        .add_header(header::AUTHORIZATION, bearer(intruder_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .patch("/api/users/watchlist/603/rate")
        .add_header(header::AUTHORIZATION, bearer(intruder_token))
        .json(&json!({ "rating": 1 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/api/users/watchlist/603/comment")
        .add_header(header::AUTHORIZATION, bearer(intruder_token))
        .json(&json!({ "text": "mine now" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/api/users/watchlist/603")
        .add_header(header::AUTHORIZATION, bearer(intruder_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server
        .get("/api/users/watchlist")
        .add_header(header::AUTHORIZATION, bearer(intruder_token))
        .await;
    let page: Value = response.json();
    assert_eq!(page["totalItems"], 0);

    let response = server
        .delete("/api/users/watchlist/603")
        .add_header(header::AUTHORIZATION, bearer(owner_token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Movie removed from watchlist");
}

#[tokio::test]
async fn test_pagination_and_search() {
    let server = create_test_server();
    let user = register(&server, "A", "a@b.com", "pw").await;
    let token = user["token"].as_str().unwrap();

    for id in 1..=14 {
        save_movie(&server, token, id, &format!("Movie {}", id)).await;
    }
    save_movie(&server, token, 27205, "Inception").await;

    let response = server
        .get("/api/users/watchlist?limit=10")
        .add_header(header::AUTHORIZATION, bearer(token))
        .await;
    let first: Value = response.json();
    assert_eq!(first["currentPage"], 1);
    assert_eq!(first["totalPages"], 2);
    assert_eq!(first["totalItems"], 15);
    assert_eq!(first["itemsPerPage"], 10);
    assert_eq!(first["watchlist"].as_array().unwrap().len(), 10);
    assert_eq!(first["watchlist"][0]["title"], "Inception");

    let response = server
        .get("/api/users/watchlist?page=2&limit=10")
        .add_header(header::AUTHORIZATION, bearer(token))
        .await;
    let second: Value = response.json();
    assert_eq!(second["watchlist"].as_array().unwrap().len(), 5);

    let response = server
        .get("/api/users/watchlist?page=abc&limit=&search=inception")
        .add_header(header::AUTHORIZATION, bearer(token))
        .await;
    let found: Value = response.json();
    assert_eq!(found["currentPage"], 1);
    assert_eq!(found["itemsPerPage"], 10);
    assert_eq!(found["totalItems"], 1);
    assert_eq!(found["watchlist"][0]["title"], "Inception");
}

#[tokio::test]
async fn test_invalid_movie_id_path() {
    let server = create_test_server();
    let user = register(&server, "A", "a@b.com", "pw").await;
    let token = user["token"].as_str().unwrap();

    server
        .patch("/api/users/watchlist/not-a-number/love")
        .add_header(header::AUTHORIZATION, bearer(token))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_read_and_update() {
    let server = create_test_server();
    let user = register(&server, "A", "a@b.com", "pw").await;
    let token = user["token"].as_str().unwrap();

    let response = server
        .get("/api/users/profile")
        .add_header(header::AUTHORIZATION, bearer(token))
        .await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["name"], "A");

    let response = server
        .put("/api/users/profile")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({ "name": "Alice", "password": "new-pw" }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["name"], "Alice");
    assert_eq!(updated["email"], "a@b.com");
    assert!(updated["token"].is_string());

    server
        .post("/api/auth/login")
        .json(&json!({ "email": "a@b.com", "password": "pw" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/auth/login")
        .json(&json!({ "email": "a@b.com", "password": "new-pw" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_trending_enriched_with_genre_names() {
    let server = create_test_server();

    let response = server.get("/api/movies/trending").await;
    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0]["genre_names"], json!(["Action", "Science Fiction"]));
    assert_eq!(movies[0]["vote_average"], 8.1);
}

#[tokio::test]
async fn test_search_requires_query() {
    let server = create_test_server();

    let response = server.get("/api/movies/search").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Search query is required");

    let response = server.get("/api/movies/search?query=superman").await;
    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(movies[0]["title"], "superman (1978)");
    assert_eq!(movies[0]["genre_names"], json!(["Adventure"]));
}

#[tokio::test]
async fn test_movie_details_and_upstream_failure() {
    let server = create_test_server();

    let response = server.get("/api/movies/27205").await;
    response.assert_status_ok();
    let movie: Value = response.json();
    assert_eq!(movie["title"], "Inception");

    server
        .get("/api/movies/0")
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_unreachable_catalog_hides_api_key() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let catalog = TmdbCatalog::new("SUPERSECRETKEY".to_string(), format!("http://{}/3", addr));
    let server = create_test_server_with_catalog(Arc::new(catalog));

    let response = server.get("/api/movies/trending").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert!(!response.text().contains("SUPERSECRETKEY"));
    let body: Value = response.json();
    assert_eq!(body["error"], "Catalog request failed");
}

#[tokio::test]
async fn test_token_for_missing_user_is_not_found() {
    let server = create_test_server();
    let tokens = TokenIssuer::new("integration-secret", chrono::Duration::days(1));
    let token = tokens.issue(uuid::Uuid::new_v4()).unwrap();

    let response = server
        .get("/api/auth/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "User not found");
}
