//! Common test utilities for integration tests
//!
//! `TestApp::new` runs against the in-memory store; `TestApp::with_postgres`
//! needs a reachable database (see `TEST_DATABASE_*`).

#![allow(dead_code)]

use authgate_backend::{
    config::AppConfig,
    db,
    repositories::{InMemoryUserStore, PgUserStore, UserStore},
    routes,
    state::AppState,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub store: Arc<dyn UserStore>,
}

impl TestApp {
    /// Create a new test application backed by the in-memory store
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryUserStore::new()))
    }

    /// Create a new test application with a real database
    pub async fn with_postgres() -> Self {
        let config = test_config();
        let pool = db::create_pool(&config.database)
            .await
            .expect("Failed to create test database pool");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self::with_store(Arc::new(PgUserStore::new(pool)))
    }

    fn with_store(store: Arc<dyn UserStore>) -> Self {
        let state = AppState::new(store.clone(), test_config()).expect("test config has a secret");
        let app = routes::create_router(state);

        Self { app, store }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    /// Make a GET request with a bearer token
    pub async fn get_auth(&self, path: &str, token: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Register and return the parsed response body
    pub async fn register(&self, username: &str, email: &str, password: &str, role: &str) -> Value {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
            "number": "555-0100",
            "role": role,
        });
        let (status, response) = self.post("/register", &body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", response);
        serde_json::from_str(&response).unwrap()
    }

    /// Login and return the issued token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = serde_json::json!({ "email": email, "password": password });
        let (status, response) = self.post("/login", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", response);
        let response: Value = serde_json::from_str(&response).unwrap();
        response["token"].as_str().unwrap().to_string()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config.jwt.secret = Some(SecretString::new(TEST_SECRET.to_string()));

    if let Ok(host) = std::env::var("TEST_DATABASE_HOST") {
        config.database.host = host;
    }
    if let Ok(user) = std::env::var("TEST_DATABASE_USER") {
        config.database.user = user;
    }
    if let Ok(password) = std::env::var("TEST_DATABASE_PASSWORD") {
        config.database.password = SecretString::new(password);
    }
    config.database.name =
        std::env::var("TEST_DATABASE_NAME").unwrap_or_else(|_| "authgate_test".to_string());
    config.database.max_connections = 5;

    config
}
