//! Membership - who owns an inventory and who belongs to it.
//!
//! Every mutation of the owner/member relation goes through
//! [`MembershipEngine`]. Each operation is one store transaction: the guards
//! and the writes see the same state, and nothing is kept if any step fails.
//! Before a transaction that touches ownership commits, the engine checks that
//! the owner still has a member row.
//!
//! `caller` is always the subject of a verified session
//! ([`Session::user_id`](crate::identity::Session::user_id)). User ids are
//! compared case-insensitively.

mod bulk;

use chrono::Utc;
use uuid::Uuid;

use crate::error::InventoryError;
use crate::identity::same_subject;
use crate::model::{Inventory, InventoryMember};
use crate::store::{InventoryStore, StoreRead};

pub use bulk::BulkRemovalReport;

/// Owner/member operations over an [`InventoryStore`].
#[derive(Debug, Clone)]
pub struct MembershipEngine<S> {
    store: S,
}

impl<S: InventoryStore> MembershipEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create an inventory owned by `caller`, with the caller as first member.
    #[tracing::instrument(skip(self, description))]
    pub fn create_inventory(
        &self,
        name: &str,
        description: Option<String>,
        caller: &str,
    ) -> Result<Inventory, InventoryError> {
        let caller = require_caller(caller)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(InventoryError::validation("inventory name is required"));
        }

        let now = Utc::now();
        let inventory = Inventory {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description,
            owner: caller.to_string(),
            created_at: now,
            last_modified_at: now,
        };

        self.store.transaction(|tx| {
            tx.insert_inventory(inventory.clone())?;
            tx.insert_member(InventoryMember::new(inventory.id, caller, now))?;
            ensure_owner_is_member(&*tx, inventory.id)
        })?;

        tracing::info!(inventory = %inventory.id, owner = %caller, "inventory created");
        Ok(inventory)
    }

    /// Delete an inventory with its members and product links. Owner only.
    #[tracing::instrument(skip(self))]
    pub fn delete_inventory(&self, inventory_id: Uuid, caller: &str) -> Result<(), InventoryError> {
        let caller = require_caller(caller)?;

        self.store.transaction(|tx| {
            let inventory = load_inventory(&*tx, inventory_id)?;
            if !inventory.is_owned_by(caller) {
                return Err(InventoryError::forbidden(
                    "only the owner can delete an inventory",
                ));
            }
            if !tx.delete_inventory(inventory_id)? {
                return Err(not_found(inventory_id));
            }
            Ok(())
        })?;

        tracing::info!(inventory = %inventory_id, "inventory deleted");
        Ok(())
    }

    /// Invite `new_user_id` into the inventory. Owner only.
    #[tracing::instrument(skip(self))]
    pub fn add_member(
        &self,
        inventory_id: Uuid,
        new_user_id: &str,
        caller: &str,
    ) -> Result<InventoryMember, InventoryError> {
        let caller = require_caller(caller)?;
        let new_user_id = new_user_id.trim();
        if new_user_id.is_empty() {
            return Err(InventoryError::validation("user id is required"));
        }

        let member = self.store.transaction(|tx| {
            let inventory = load_inventory(&*tx, inventory_id)?;
            if !inventory.is_owned_by(caller) {
                return Err(InventoryError::forbidden("only the owner can add members"));
            }
            if tx.member_exists(inventory_id, new_user_id)? {
                return Err(InventoryError::conflict(format!(
                    "{} is already a member",
                    new_user_id
                )));
            }

            let member = InventoryMember::new(inventory_id, new_user_id, Utc::now());
            tx.insert_member(member.clone())?;
            Ok(member)
        })?;

        tracing::info!(inventory = %inventory_id, member = %new_user_id, "member added");
        Ok(member)
    }

    /// Remove `target_user_id` from the inventory.
    ///
    /// A member may remove themselves; the owner may remove anyone but
    /// themselves. Ownership has to be transferred before the owner can leave.
    #[tracing::instrument(skip(self))]
    pub fn remove_member(
        &self,
        inventory_id: Uuid,
        target_user_id: &str,
        caller: &str,
    ) -> Result<(), InventoryError> {
        let caller = require_caller(caller)?;

        self.store.transaction(|tx| {
            let inventory = load_inventory(&*tx, inventory_id)?;
            if inventory.is_owned_by(target_user_id) {
                return Err(InventoryError::validation(
                    "the owner cannot be removed; transfer ownership first",
                ));
            }
            if !same_subject(caller, target_user_id) && !inventory.is_owned_by(caller) {
                return Err(InventoryError::forbidden(
                    "only the owner can remove other members",
                ));
            }
            if !tx.delete_member(inventory_id, target_user_id)? {
                return Err(InventoryError::not_found(format!(
                    "member {} of inventory {}",
                    target_user_id, inventory_id
                )));
            }
            ensure_owner_is_member(&*tx, inventory_id)
        })?;

        tracing::info!(inventory = %inventory_id, member = %target_user_id, "member removed");
        Ok(())
    }

    /// Make `new_owner_id` the owner, enrolling them as a member if needed.
    /// Owner only. Transferring to the current owner changes nothing.
    #[tracing::instrument(skip(self))]
    pub fn transfer_ownership(
        &self,
        inventory_id: Uuid,
        new_owner_id: &str,
        caller: &str,
    ) -> Result<Inventory, InventoryError> {
        let caller = require_caller(caller)?;
        let new_owner_id = new_owner_id.trim();
        if new_owner_id.is_empty() {
            return Err(InventoryError::validation("new owner id is required"));
        }

        let inventory = self.store.transaction(|tx| {
            let inventory = load_inventory(&*tx, inventory_id)?;
            if !inventory.is_owned_by(caller) {
                return Err(InventoryError::forbidden(
                    "only the owner can transfer ownership",
                ));
            }
            if inventory.is_owned_by(new_owner_id) {
                return Ok(inventory);
            }

            let now = Utc::now();
            if !tx.member_exists(inventory_id, new_owner_id)? {
                tx.insert_member(InventoryMember::new(inventory_id, new_owner_id, now))?;
            }
            if !tx.set_inventory_owner(inventory_id, new_owner_id, now)? {
                return Err(not_found(inventory_id));
            }
            ensure_owner_is_member(&*tx, inventory_id)?;
            load_inventory(&*tx, inventory_id)
        })?;

        tracing::info!(inventory = %inventory_id, owner = %inventory.owner, "ownership transferred");
        Ok(inventory)
    }

    /// Unlink the requested products from the inventory and report what
    /// happened to each id. Members only.
    ///
    /// Repeated ids count once. Classification and deletion run in the same
    /// transaction, so `deleted_count` is what the delete removed.
    #[tracing::instrument(skip(self, requested_product_ids), fields(requested = requested_product_ids.len()))]
    pub fn bulk_remove_products(
        &self,
        inventory_id: Uuid,
        requested_product_ids: &[Uuid],
        caller: &str,
    ) -> Result<BulkRemovalReport, InventoryError> {
        let caller = require_caller(caller)?;
        let requested = bulk::dedup_preserving_order(requested_product_ids);
        if requested.is_empty() {
            return Err(InventoryError::validation("no product ids given"));
        }

        let report = self.store.transaction(|tx| {
            load_for_member(&*tx, inventory_id, caller)?;

            let found = tx.list_products_by_ids(&requested)?;
            let linked = tx.list_links_for_products(inventory_id, &requested)?;
            let deleted = tx.delete_product_links(inventory_id, &requested)?;

            Ok::<_, InventoryError>(BulkRemovalReport::reconcile(
                &requested, &found, &linked, deleted,
            ))
        })?;

        tracing::info!(
            inventory = %inventory_id,
            deleted = report.deleted_count,
            missing = report.missing_ids.len(),
            not_linked = report.not_linked_names.len(),
            "bulk product removal"
        );
        Ok(report)
    }
}

pub(crate) fn require_caller(caller: &str) -> Result<&str, InventoryError> {
    let caller = caller.trim();
    if caller.is_empty() {
        return Err(InventoryError::Unauthorized);
    }
    Ok(caller)
}

fn not_found(inventory_id: Uuid) -> InventoryError {
    InventoryError::not_found(format!("inventory {}", inventory_id))
}

pub(crate) fn load_inventory<R: StoreRead + ?Sized>(
    store: &R,
    inventory_id: Uuid,
) -> Result<Inventory, InventoryError> {
    store
        .get_inventory(inventory_id)?
        .ok_or_else(|| not_found(inventory_id))
}

/// Load an inventory the caller belongs to. Anyone else gets `Forbidden`.
///
/// Every inventory-scoped read and write outside this module goes through
/// here, so member-only access is decided in one place.
pub(crate) fn load_for_member<R: StoreRead + ?Sized>(
    store: &R,
    inventory_id: Uuid,
    caller: &str,
) -> Result<Inventory, InventoryError> {
    let caller = require_caller(caller)?;
    let inventory = load_inventory(store, inventory_id)?;
    if !store.member_exists(inventory_id, caller)? {
        return Err(InventoryError::forbidden(
            "only members can access this inventory",
        ));
    }
    Ok(inventory)
}

/// The owner of an inventory must also be one of its members.
fn ensure_owner_is_member<R: StoreRead + ?Sized>(
    store: &R,
    inventory_id: Uuid,
) -> Result<(), InventoryError> {
    let inventory = load_inventory(store, inventory_id)?;
    if !store.member_exists(inventory_id, &inventory.owner)? {
        tracing::error!(inventory = %inventory_id, owner = %inventory.owner, "owner is not a member");
        return Err(InventoryError::Invariant(format!(
            "owner of inventory {} is not a member",
            inventory_id
        )));
    }
    Ok(())
}
