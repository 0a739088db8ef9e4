//! Directory backed by a Keycloak realm.
//!
//! Profiles come from the OpenID `userinfo` endpoint, called with the
//! caller's own token. The user listing comes from the realm's admin API,
//! whose URL is derived from the userinfo URL:
//!
//! ```text
//! https://auth.example.com/realms/home/protocol/openid-connect/userinfo
//! https://auth.example.com/admin/realms/home/users
//! ```

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use super::directory::{IdentityDirectory, UserProfile};
use super::error::DirectoryError;
use super::same_subject;

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: Option<String>,
    name: Option<String>,
    preferred_username: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminUser {
    id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
}

/// [`IdentityDirectory`] over a Keycloak realm. Every request is bounded by
/// the configured timeout.
#[derive(Debug, Clone)]
pub struct KeycloakDirectory {
    http: Client,
    userinfo: Url,
    admin_users: Option<Url>,
}

impl KeycloakDirectory {
    pub fn new(userinfo_endpoint: &str, timeout: Duration) -> Result<Self, DirectoryError> {
        let userinfo = Url::parse(userinfo_endpoint)
            .map_err(|e| DirectoryError::Malformed(format!("userinfo endpoint: {}", e)))?;
        let http = Client::builder().timeout(timeout).build()?;
        let admin_users = admin_users_url(&userinfo);
        if admin_users.is_none() {
            tracing::warn!(%userinfo, "userinfo endpoint is not realm-scoped; user listing disabled");
        }
        Ok(Self {
            http,
            userinfo,
            admin_users,
        })
    }

    pub fn userinfo_endpoint(&self) -> &Url {
        &self.userinfo
    }

    pub fn admin_users_endpoint(&self) -> Option<&Url> {
        self.admin_users.as_ref()
    }
}

impl IdentityDirectory for KeycloakDirectory {
    #[tracing::instrument(skip(self, bearer))]
    async fn get_profile(
        &self,
        user_id: &str,
        bearer: Option<&str>,
    ) -> Result<Option<UserProfile>, DirectoryError> {
        let Some(bearer) = bearer else {
            return Ok(None);
        };

        let resp = self
            .http
            .get(self.userinfo.clone())
            .bearer_auth(bearer)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(DirectoryError::Status(resp.status().as_u16()));
        }
        let info: UserInfo = resp
            .json()
            .await
            .map_err(|e| DirectoryError::Malformed(e.to_string()))?;

        Ok(profile_from_userinfo(user_id, info))
    }

    #[tracing::instrument(skip(self, bearer))]
    async fn list_profiles(&self, bearer: Option<&str>) -> Result<Vec<UserProfile>, DirectoryError> {
        let url = self
            .admin_users
            .clone()
            .ok_or(DirectoryError::NotConfigured("admin users endpoint"))?;

        let mut req = self.http.get(url);
        if let Some(bearer) = bearer {
            req = req.bearer_auth(bearer);
        }
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(DirectoryError::Status(resp.status().as_u16()));
        }
        let users: Vec<AdminUser> = resp
            .json()
            .await
            .map_err(|e| DirectoryError::Malformed(e.to_string()))?;

        Ok(users.into_iter().filter_map(profile_from_admin_user).collect())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// `{scheme}://{host[:port]}/admin/realms/{realm}/users`, when the userinfo
/// path starts with `realms/{realm}`.
fn admin_users_url(userinfo: &Url) -> Option<Url> {
    let mut segments = userinfo.path_segments()?.filter(|s| !s.is_empty());
    if segments.next()? != "realms" {
        return None;
    }
    let realm = segments.next()?;

    let mut url = userinfo.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .ok()?
        .clear()
        .extend(["admin", "realms", realm, "users"]);
    Some(url)
}

/// Build a profile from a userinfo response. The response must be about
/// `user_id`.
fn profile_from_userinfo(user_id: &str, info: UserInfo) -> Option<UserProfile> {
    let sub = info.sub.as_deref().filter(|s| same_subject(s, user_id))?;
    let display = non_empty(&info.name)
        .or(non_empty(&info.preferred_username))
        .or(non_empty(&info.email))
        .unwrap_or(sub);
    Some(UserProfile::new(sub, display))
}

fn profile_from_admin_user(user: AdminUser) -> Option<UserProfile> {
    let id = non_empty(&user.id)?;
    let display = match (non_empty(&user.first_name), non_empty(&user.last_name)) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (Some(first), None) => first.to_string(),
        (None, _) => non_empty(&user.username).unwrap_or(id).to_string(),
    };
    Some(UserProfile::new(id, display))
}
