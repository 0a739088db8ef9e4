use home_inventory::identity::{DirectoryError, IdentityDirectory, UserProfile};
use serde_json::{json, Value};

use crate::support::{start_server, start_server_with, Api};

/// A directory whose provider is down.
struct UnreachableDirectory;

impl IdentityDirectory for UnreachableDirectory {
    async fn get_profile(
        &self,
        _user_id: &str,
        _bearer: Option<&str>,
    ) -> Result<Option<UserProfile>, DirectoryError> {
        Err(DirectoryError::Status(502))
    }

    async fn list_profiles(&self, _bearer: Option<&str>) -> Result<Vec<UserProfile>, DirectoryError> {
        Err(DirectoryError::Status(502))
    }
}

#[tokio::test]
async fn lists_directory_profiles() {
    let base = start_server().await;
    let alice = Api::new(&base, "alice");

    let resp = alice.get("/api/users").await;
    assert_eq!(resp.status(), 200);
    let profiles: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(profiles.len(), 2);
    assert!(profiles.contains(&json!({ "userId": "bob", "displayName": "Bob" })));
}

#[tokio::test]
async fn profile_is_visible_to_its_owner_only() {
    let base = start_server().await;
    let alice = Api::new(&base, "alice");

    let resp = alice.get("/api/users/alice/profile").await;
    assert_eq!(resp.status(), 200);
    let profile: Value = resp.json().await.unwrap();
    assert_eq!(profile["displayName"], "Alice Liddell");

    let resp = alice.get("/api/users/bob/profile").await;
    assert_eq!(resp.status(), 403);

    let carol = Api::new(&base, "carol");
    let resp = carol.get("/api/users/carol/profile").await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn user_inventories_include_memberships() {
    let base = start_server().await;
    let alice = Api::new(&base, "alice");
    let bob = Api::new(&base, "bob");
    let pantry = alice.create_inventory("Pantry").await;
    bob.create_inventory("Garage").await;
    alice
        .post(&format!("/api/inventory/{pantry}/members"), json!({ "userId": "bob" }))
        .await;

    let resp = bob.get("/api/users/bob/inventories").await;
    assert_eq!(resp.status(), 200);
    let inventories: Vec<Value> = resp.json().await.unwrap();
    let mut names: Vec<&str> = inventories
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["Garage", "Pantry"]);

    let resp = bob.get("/api/users/alice/inventories").await;
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn unreachable_directory_degrades() {
    let base = start_server_with(UnreachableDirectory).await;
    let alice = Api::new(&base, "alice");

    let resp = alice.get("/api/users").await;
    assert_eq!(resp.status(), 503);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "user directory unavailable");

    let resp = alice.get("/api/users/alice/profile").await;
    assert_eq!(resp.status(), 404);

    let resp = alice.get("/api/users/alice/inventories").await;
    assert_eq!(resp.status(), 200);
}
