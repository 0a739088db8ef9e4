//! InMemoryStore - table-backed store for development and testing.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{InventoryStore, StoreError, StoreRead, StoreWrite};
use crate::identity::same_subject;
use crate::model::{Inventory, InventoryMember, InventoryProduct, Product};
use crate::record::{Record, Table};

/// A row as it was before a write. Replayed newest-first on rollback.
#[derive(Debug)]
enum Undo {
    Inventory(Uuid, Option<Inventory>),
    Member(<InventoryMember as Record>::Key, Option<InventoryMember>),
    Product(Uuid, Option<Product>),
    Link(<InventoryProduct as Record>::Key, Option<InventoryProduct>),
}

/// The four tables of the store, plus the undo journal of the running
/// transaction.
#[derive(Debug, Default)]
struct Tables {
    inventories: Table<Inventory>,
    members: Table<InventoryMember>,
    products: Table<Product>,
    links: Table<InventoryProduct>,
    journal: Vec<Undo>,
}

impl Tables {
    fn rollback(&mut self) {
        while let Some(undo) = self.journal.pop() {
            match undo {
                Undo::Inventory(key, row) => self.inventories.restore(key, row),
                Undo::Member(key, row) => self.members.restore(key, row),
                Undo::Product(key, row) => self.products.restore(key, row),
                Undo::Link(key, row) => self.links.restore(key, row),
            }
        }
    }
}

/// In-memory store backed by keyed tables behind one `RwLock`.
///
/// A transaction holds the write lock for its whole run and writes to the
/// live tables, journaling the prior state of every row it touches. If the
/// closure fails the journal is replayed backwards. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl InventoryStore for InMemoryStore {
    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreRead) -> Result<T, E>,
        E: From<StoreError>,
    {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        f(&*tables)
    }

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreWrite) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::LockPoisoned("transaction"))?;

        tables.journal.clear();
        let result = f(&mut *tables);
        if result.is_err() {
            tracing::debug!(undone = tables.journal.len(), "transaction rolled back");
            tables.rollback();
        }
        tables.journal.clear();
        result
    }
}

impl StoreRead for Tables {
    fn get_inventory(&self, id: Uuid) -> Result<Option<Inventory>, StoreError> {
        Ok(self.inventories.get(&id).cloned())
    }

    fn list_inventories_for_member(&self, user_id: &str) -> Result<Vec<Inventory>, StoreError> {
        Ok(self
            .members
            .filter(|m| same_subject(&m.user_id, user_id))
            .filter_map(|m| self.inventories.get(&m.inventory_id).cloned())
            .collect())
    }

    fn list_members(&self, inventory_id: Uuid) -> Result<Vec<InventoryMember>, StoreError> {
        Ok(self
            .members
            .filter(|m| m.inventory_id == inventory_id)
            .cloned()
            .collect())
    }

    fn member_exists(&self, inventory_id: Uuid, user_id: &str) -> Result<bool, StoreError> {
        Ok(self.members.contains(&(inventory_id, user_id.to_lowercase())))
    }

    fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get(&id).cloned())
    }

    fn get_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.products.iter().find(|p| p.name == name).cloned())
    }

    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.iter().cloned().collect())
    }

    fn list_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, StoreError> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        Ok(self
            .products
            .filter(|p| wanted.contains(&p.id))
            .cloned()
            .collect())
    }

    fn get_link(
        &self,
        inventory_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<InventoryProduct>, StoreError> {
        Ok(self.links.get(&(inventory_id, product_id)).cloned())
    }

    fn product_link_exists(&self, inventory_id: Uuid, product_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.links.contains(&(inventory_id, product_id)))
    }

    fn list_links(&self, inventory_id: Uuid) -> Result<Vec<InventoryProduct>, StoreError> {
        Ok(self
            .links
            .filter(|l| l.inventory_id == inventory_id)
            .cloned()
            .collect())
    }

    fn list_links_for_products(
        &self,
        inventory_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<InventoryProduct>, StoreError> {
        let wanted: HashSet<&Uuid> = product_ids.iter().collect();
        Ok(self
            .links
            .filter(|l| l.inventory_id == inventory_id && wanted.contains(&l.product_id))
            .cloned()
            .collect())
    }
}

impl StoreWrite for Tables {
    fn insert_inventory(&mut self, inventory: Inventory) -> Result<(), StoreError> {
        let key = inventory.key();
        self.inventories.insert(inventory)?;
        self.journal.push(Undo::Inventory(key, None));
        Ok(())
    }

    fn update_inventory(&mut self, inventory: Inventory) -> Result<bool, StoreError> {
        let key = inventory.key();
        let Some(previous) = self.inventories.replace(inventory) else {
            return Ok(false);
        };
        self.journal.push(Undo::Inventory(key, Some(previous)));
        Ok(true)
    }

    fn set_inventory_owner(
        &mut self,
        id: Uuid,
        new_owner: &str,
        modified_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(mut inventory) = self.inventories.get(&id).cloned() else {
            return Ok(false);
        };
        inventory.owner = new_owner.to_string();
        inventory.last_modified_at = modified_at;
        self.update_inventory(inventory)
    }

    fn delete_inventory(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let Some(removed) = self.inventories.remove(&id) else {
            return Ok(false);
        };
        self.journal.push(Undo::Inventory(id, Some(removed)));
        for member in self.members.take_where(|m| m.inventory_id == id) {
            self.journal.push(Undo::Member(member.key(), Some(member)));
        }
        for link in self.links.take_where(|l| l.inventory_id == id) {
            self.journal.push(Undo::Link(link.key(), Some(link)));
        }
        Ok(true)
    }

    fn insert_member(&mut self, member: InventoryMember) -> Result<(), StoreError> {
        let key = member.key();
        self.members.insert(member)?;
        self.journal.push(Undo::Member(key, None));
        Ok(())
    }

    fn delete_member(&mut self, inventory_id: Uuid, user_id: &str) -> Result<bool, StoreError> {
        let key = (inventory_id, user_id.to_lowercase());
        let Some(removed) = self.members.remove(&key) else {
            return Ok(false);
        };
        self.journal.push(Undo::Member(key, Some(removed)));
        Ok(true)
    }

    fn insert_product(&mut self, product: Product) -> Result<(), StoreError> {
        let key = product.key();
        self.products.insert(product)?;
        self.journal.push(Undo::Product(key, None));
        Ok(())
    }

    fn update_product(&mut self, product: Product) -> Result<bool, StoreError> {
        let key = product.key();
        let Some(previous) = self.products.replace(product) else {
            return Ok(false);
        };
        self.journal.push(Undo::Product(key, Some(previous)));
        Ok(true)
    }

    fn delete_product(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let Some(removed) = self.products.remove(&id) else {
            return Ok(false);
        };
        self.journal.push(Undo::Product(id, Some(removed)));
        for link in self.links.take_where(|l| l.product_id == id) {
            self.journal.push(Undo::Link(link.key(), Some(link)));
        }
        Ok(true)
    }

    fn insert_link(&mut self, link: InventoryProduct) -> Result<(), StoreError> {
        if !self.inventories.contains(&link.inventory_id) {
            return Err(StoreError::Storage(format!(
                "link references missing inventory {}",
                link.inventory_id
            )));
        }
        if !self.products.contains(&link.product_id) {
            return Err(StoreError::Storage(format!(
                "link references missing product {}",
                link.product_id
            )));
        }
        let key = link.key();
        self.links.insert(link)?;
        self.journal.push(Undo::Link(key, None));
        Ok(())
    }

    fn update_link(&mut self, link: InventoryProduct) -> Result<bool, StoreError> {
        let key = link.key();
        let Some(previous) = self.links.replace(link) else {
            return Ok(false);
        };
        self.journal.push(Undo::Link(key, Some(previous)));
        Ok(true)
    }

    fn delete_product_links(
        &mut self,
        inventory_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<usize, StoreError> {
        let doomed: HashSet<&Uuid> = product_ids.iter().collect();
        let removed = self
            .links
            .take_where(|l| l.inventory_id == inventory_id && doomed.contains(&l.product_id));
        let count = removed.len();
        for link in removed {
            self.journal.push(Undo::Link(link.key(), Some(link)));
        }
        Ok(count)
    }
}
