//! Store - persistence for inventories, members, products and links.
//!
//! Operations are split in two object-safe traits:
//!
//! - [`StoreRead`] - point lookups and filtered scans
//! - [`StoreWrite`] - inserts, updates and deletes (cascading where rows depend
//!   on each other)
//!
//! An [`InventoryStore`] hands out a read view or runs a closure as one atomic
//! transaction. If the closure returns `Err`, none of its writes are kept.
//! [`SqliteStore`] persists to a database file; [`InMemoryStore`] keeps
//! everything in process and backs the tests.
//!
//! ```ignore
//! let store = InMemoryStore::new();
//! store.transaction(|tx| {
//!     tx.insert_inventory(inventory.clone())?;
//!     tx.insert_member(InventoryMember::new(inventory.id, &inventory.owner, now))?;
//!     Ok::<_, StoreError>(())
//! })?;
//! ```

mod error;
mod in_memory;
mod sqlite;

use uuid::Uuid;

use crate::model::{Inventory, InventoryMember, InventoryProduct, Product};

pub use error::StoreError;
pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Read operations over all four tables.
pub trait StoreRead {
    fn get_inventory(&self, id: Uuid) -> Result<Option<Inventory>, StoreError>;

    /// Inventories the user is a member of (case-insensitive user match).
    fn list_inventories_for_member(&self, user_id: &str) -> Result<Vec<Inventory>, StoreError>;

    fn list_members(&self, inventory_id: Uuid) -> Result<Vec<InventoryMember>, StoreError>;

    fn member_exists(&self, inventory_id: Uuid, user_id: &str) -> Result<bool, StoreError>;

    fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    fn get_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Products whose id is in `ids`. Unknown ids are skipped.
    fn list_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, StoreError>;

    fn get_link(
        &self,
        inventory_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<InventoryProduct>, StoreError>;

    fn product_link_exists(&self, inventory_id: Uuid, product_id: Uuid) -> Result<bool, StoreError>;

    fn list_links(&self, inventory_id: Uuid) -> Result<Vec<InventoryProduct>, StoreError>;

    /// Links of one inventory whose product id is in `product_ids`.
    fn list_links_for_products(
        &self,
        inventory_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<InventoryProduct>, StoreError>;
}

/// Write operations. Only reachable inside a transaction.
pub trait StoreWrite: StoreRead {
    /// Fails with `Duplicate` if the id is taken.
    fn insert_inventory(&mut self, inventory: Inventory) -> Result<(), StoreError>;

    /// Replace an inventory row. Returns false if it does not exist.
    fn update_inventory(&mut self, inventory: Inventory) -> Result<bool, StoreError>;

    /// Reassign the owner field. Returns false if the inventory does not exist.
    fn set_inventory_owner(
        &mut self,
        id: Uuid,
        new_owner: &str,
        modified_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<bool, StoreError>;

    /// Delete an inventory with its members and links. Returns false if it did
    /// not exist.
    fn delete_inventory(&mut self, id: Uuid) -> Result<bool, StoreError>;

    /// Fails with `Duplicate` if the user already is a member.
    fn insert_member(&mut self, member: InventoryMember) -> Result<(), StoreError>;

    /// Returns false if there was no such member.
    fn delete_member(&mut self, inventory_id: Uuid, user_id: &str) -> Result<bool, StoreError>;

    /// Fails with `Duplicate` if the id is taken.
    fn insert_product(&mut self, product: Product) -> Result<(), StoreError>;

    /// Replace a product row. Returns false if it does not exist.
    fn update_product(&mut self, product: Product) -> Result<bool, StoreError>;

    /// Delete a product with every link to it. Returns false if it did not exist.
    fn delete_product(&mut self, id: Uuid) -> Result<bool, StoreError>;

    /// Fails with `Duplicate` if the pair is already linked.
    fn insert_link(&mut self, link: InventoryProduct) -> Result<(), StoreError>;

    /// Replace a link row. Returns false if it does not exist.
    fn update_link(&mut self, link: InventoryProduct) -> Result<bool, StoreError>;

    /// Delete the links of one inventory to the given products. Returns the
    /// number of rows deleted.
    fn delete_product_links(
        &mut self,
        inventory_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<usize, StoreError>;
}

/// A store that serves consistent reads and atomic read-write transactions.
pub trait InventoryStore: Send + Sync + 'static {
    /// Run `f` against a consistent read view.
    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreRead) -> Result<T, E>,
        E: From<StoreError>;

    /// Run `f` as one transaction. Writes become visible only if `f` returns
    /// `Ok`; transactions on the same store do not interleave.
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreWrite) -> Result<T, E>,
        E: From<StoreError>;
}
