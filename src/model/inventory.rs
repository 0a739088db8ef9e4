use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::same_subject;
use crate::record::Record;

/// A shared inventory. `owner` is the subject of the user who owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
#[record(table = "inventories")]
pub struct Inventory {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

impl Inventory {
    /// Case-insensitive owner check.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        same_subject(&self.owner, user_id)
    }
}

/// Membership of a user in an inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
#[record(table = "inventory_members")]
pub struct InventoryMember {
    #[record(key)]
    pub inventory_id: Uuid,
    #[record(key, fold_case)]
    pub user_id: String,
    pub member_since: DateTime<Utc>,
}

impl InventoryMember {
    pub fn new(inventory_id: Uuid, user_id: impl Into<String>, member_since: DateTime<Utc>) -> Self {
        Self {
            inventory_id,
            user_id: user_id.into(),
            member_since,
        }
    }
}
