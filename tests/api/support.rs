//! Test server: the full router over an in-memory store, HS256 tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use home_inventory::api::{self, AppState};
use home_inventory::identity::{IdentityDirectory, StaticDirectory, TokenVerifier};
use home_inventory::store::InMemoryStore;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

pub const SECRET: &[u8] = b"api-test-secret";
pub const ISSUER: &str = "https://auth.example.com/realms/home";
pub const AUDIENCE: &str = "home-inventory";

pub fn directory() -> StaticDirectory {
    StaticDirectory::default()
        .with_profile("alice", "Alice Liddell")
        .with_profile("bob", "Bob")
}

/// Bind to port 0 and return the base URL.
pub async fn start_server() -> String {
    start_server_with(directory()).await
}

/// Same as [`start_server`], with another identity directory.
pub async fn start_server_with<D: IdentityDirectory>(directory: D) -> String {
    let verifier = TokenVerifier::with_secret(ISSUER, AUDIENCE, SECRET);
    let state = AppState::new(InMemoryStore::new(), verifier, directory);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

pub fn sign(claims: Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

/// A valid token for `sub`.
pub fn token(sub: &str) -> String {
    sign(json!({
        "sub": sub,
        "aud": AUDIENCE,
        "iss": ISSUER,
        "exp": now() + 600,
        "preferred_username": format!("{sub}.user"),
    }))
}

pub fn expired_token(sub: &str) -> String {
    sign(json!({
        "sub": sub,
        "aud": AUDIENCE,
        "iss": ISSUER,
        "exp": now() - 600,
    }))
}

pub fn foreign_audience_token(sub: &str) -> String {
    sign(json!({
        "sub": sub,
        "aud": "another-app",
        "iss": ISSUER,
        "exp": now() + 600,
    }))
}

/// Thin client that authenticates as one user.
pub struct Api {
    pub base: String,
    pub http: reqwest::Client,
    token: String,
}

impl Api {
    pub fn new(base: &str, user: &str) -> Self {
        Self {
            base: base.to_string(),
            http: reqwest::Client::new(),
            token: token(user),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .unwrap()
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn put(&self, path: &str, body: Value) -> reqwest::Response {
        self.http
            .put(self.url(path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.http
            .delete(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .unwrap()
    }

    /// Create an inventory and return its id.
    pub async fn create_inventory(&self, name: &str) -> String {
        let resp = self.post("/api/inventory", json!({ "name": name })).await;
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    /// Create a product and return its id.
    pub async fn create_product(&self, name: &str) -> String {
        let resp = self
            .post(
                "/api/products",
                json!({ "name": name, "supposedPrice": 1.5, "unit": "Pack" }),
            )
            .await;
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }
}
