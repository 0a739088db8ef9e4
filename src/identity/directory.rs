use std::future::Future;

use serde::{Deserialize, Serialize};

use super::error::DirectoryError;
use super::same_subject;

/// What the directory knows about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Profile lookups against the identity provider.
///
/// `bearer` is the caller's own access token; implementations that call the
/// provider on the caller's behalf forward it.
pub trait IdentityDirectory: Send + Sync + 'static {
    /// Profile of one user, `None` if the directory does not know them.
    fn get_profile(
        &self,
        user_id: &str,
        bearer: Option<&str>,
    ) -> impl Future<Output = Result<Option<UserProfile>, DirectoryError>> + Send;

    /// Every profile the directory can enumerate.
    fn list_profiles(
        &self,
        bearer: Option<&str>,
    ) -> impl Future<Output = Result<Vec<UserProfile>, DirectoryError>> + Send;
}

/// A fixed set of profiles. Used when no provider directory is configured.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    profiles: Vec<UserProfile>,
}

impl StaticDirectory {
    pub fn new(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        Self {
            profiles: profiles.into_iter().collect(),
        }
    }

    pub fn with_profile(mut self, user_id: &str, display_name: &str) -> Self {
        self.profiles.push(UserProfile::new(user_id, display_name));
        self
    }
}

impl IdentityDirectory for StaticDirectory {
    async fn get_profile(
        &self,
        user_id: &str,
        _bearer: Option<&str>,
    ) -> Result<Option<UserProfile>, DirectoryError> {
        Ok(self
            .profiles
            .iter()
            .find(|p| same_subject(&p.user_id, user_id))
            .cloned())
    }

    async fn list_profiles(&self, _bearer: Option<&str>) -> Result<Vec<UserProfile>, DirectoryError> {
        Ok(self.profiles.clone())
    }
}
