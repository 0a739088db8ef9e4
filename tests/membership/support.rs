//! Shared fixtures: an engine and catalog over one in-memory store.
//!
//! State checks read the store directly so they see through the member gate.

use home_inventory::catalog::{Catalog, ProductInput};
use home_inventory::membership::MembershipEngine;
use home_inventory::model::{Inventory, PackageUnit, Product};
use home_inventory::store::{InMemoryStore, InventoryStore};
use uuid::Uuid;

pub struct Fixture {
    pub store: InMemoryStore,
    pub engine: MembershipEngine<InMemoryStore>,
    pub catalog: Catalog<InMemoryStore>,
}

impl Fixture {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        Self {
            engine: MembershipEngine::new(store.clone()),
            catalog: Catalog::new(store.clone()),
            store,
        }
    }

    /// An inventory owned by `owner`.
    pub fn inventory(&self, owner: &str) -> Inventory {
        self.engine
            .create_inventory("Pantry", Some("Kitchen shelves".into()), owner)
            .unwrap()
    }

    pub fn product(&self, name: &str) -> Product {
        self.catalog
            .create_product(ProductInput {
                name: name.into(),
                description: None,
                supposed_price: 2.5,
                unit: PackageUnit::Piece,
            })
            .unwrap()
    }

    /// Sorted user ids of the inventory's members.
    pub fn members(&self, inventory: &Inventory) -> Vec<String> {
        let mut ids: Vec<String> = self
            .store
            .read(|r| r.list_members(inventory.id))
            .unwrap()
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        ids.sort();
        ids
    }

    pub fn owner(&self, inventory: &Inventory) -> String {
        self.owner_of(inventory.id)
    }

    pub fn owner_of(&self, inventory_id: Uuid) -> String {
        self.store
            .read(|r| r.get_inventory(inventory_id))
            .unwrap()
            .expect("inventory exists")
            .owner
    }

    pub fn link_count(&self, inventory: &Inventory) -> usize {
        self.store
            .read(|r| r.list_links(inventory.id))
            .unwrap()
            .len()
    }
}
