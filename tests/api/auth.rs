use serde_json::Value;

use crate::support::{self, expired_token, foreign_audience_token, start_server, Api};

#[tokio::test]
async fn health_needs_no_token() {
    let base = start_server().await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn missing_token_returns_401() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    for path in ["/api/whoami", "/api/products", "/api/users"] {
        let resp = client.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(resp.status(), 401, "{path}");
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn rejected_tokens_return_401() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &serde_json::json!({
            "sub": "alice",
            "aud": support::AUDIENCE,
            "iss": support::ISSUER,
            "exp": u64::MAX / 2,
        }),
        &jsonwebtoken::EncodingKey::from_secret(b"not-the-secret"),
    )
    .unwrap();

    for token in [
        expired_token("alice"),
        foreign_audience_token("alice"),
        forged,
        "garbage".to_string(),
    ] {
        let resp = client
            .get(format!("{base}/api/whoami"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
    }
}

#[tokio::test]
async fn whoami_reports_verified_subject() {
    let base = start_server().await;
    let api = Api::new(&base, "alice");

    let resp = api.get("/api/whoami").await;
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["userId"], "alice");
    assert_eq!(body["displayName"], "alice.user");
}

#[tokio::test]
async fn body_cannot_pick_the_owner() {
    let base = start_server().await;
    let api = Api::new(&base, "alice");

    let resp = api
        .post(
            "/api/inventory",
            serde_json::json!({ "name": "Pantry", "owner": "mallory" }),
        )
        .await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["owner"], "alice");
}
