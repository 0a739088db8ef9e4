//! Catalog - plain reads and writes of inventories, products and stock links.
//!
//! Nothing here touches the owner/member relation; that lives in
//! [`membership`](crate::membership). Inventory-scoped operations take the
//! caller and are open to members of that inventory only. The product catalog
//! is shared by everyone. Writes run as one store transaction.

mod input;

use chrono::Utc;
use uuid::Uuid;

use crate::error::InventoryError;
use crate::membership::{load_for_member, require_caller};
use crate::model::{
    Inventory, InventoryMember, InventoryProduct, InventoryProductView, Product,
};
use crate::store::{InventoryStore, StoreRead};

pub use input::{InventoryUpdate, LinkAmounts, NewInventoryProduct, ProductInput};

/// Inventory, product and link operations over an [`InventoryStore`].
#[derive(Debug, Clone)]
pub struct Catalog<S> {
    store: S,
}

impl<S: InventoryStore> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // Inventories

    pub fn get_inventory(&self, inventory_id: Uuid, caller: &str) -> Result<Inventory, InventoryError> {
        self.store.read(|r| load_for_member(r, inventory_id, caller))
    }

    /// Rename or re-describe an inventory. The owner is not changed here.
    #[tracing::instrument(skip(self, update))]
    pub fn update_inventory(
        &self,
        inventory_id: Uuid,
        update: InventoryUpdate,
        caller: &str,
    ) -> Result<Inventory, InventoryError> {
        let name = required_name(&update.name, "inventory name")?;

        self.store.transaction(|tx| {
            let mut inventory = load_for_member(&*tx, inventory_id, caller)?;
            inventory.name = name.to_string();
            inventory.description = update.description;
            inventory.last_modified_at = Utc::now();
            tx.update_inventory(inventory.clone())?;
            Ok(inventory)
        })
    }

    /// Inventories `user_id` is a member of.
    pub fn list_user_inventories(&self, user_id: &str) -> Result<Vec<Inventory>, InventoryError> {
        let user_id = require_caller(user_id)?;
        self.store
            .read(|r| Ok::<_, InventoryError>(r.list_inventories_for_member(user_id)?))
    }

    pub fn list_members(
        &self,
        inventory_id: Uuid,
        caller: &str,
    ) -> Result<Vec<InventoryMember>, InventoryError> {
        self.store.read(|r| {
            load_for_member(r, inventory_id, caller)?;
            Ok(r.list_members(inventory_id)?)
        })
    }

    // Products

    pub fn list_products(&self) -> Result<Vec<Product>, InventoryError> {
        self.store.read(|r| Ok::<_, InventoryError>(r.list_products()?))
    }

    pub fn get_product(&self, name: &str) -> Result<Product, InventoryError> {
        self.store.read(|r| load_product(r, name))
    }

    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub fn create_product(&self, input: ProductInput) -> Result<Product, InventoryError> {
        let input = input.validated()?;

        let product = self.store.transaction(|tx| {
            if tx.get_product_by_name(&input.name)?.is_some() {
                return Err(name_taken(&input.name));
            }
            let product = input.into_product(Uuid::new_v4());
            tx.insert_product(product.clone())?;
            Ok(product)
        })?;

        tracing::info!(product = %product.id, "product created");
        Ok(product)
    }

    /// Replace the product currently called `name`. Renaming onto another
    /// product's name is a conflict.
    #[tracing::instrument(skip(self, input))]
    pub fn update_product(&self, name: &str, input: ProductInput) -> Result<Product, InventoryError> {
        let input = input.validated()?;

        self.store.transaction(|tx| {
            let existing = load_product(&*tx, name)?;
            if let Some(other) = tx.get_product_by_name(&input.name)? {
                if other.id != existing.id {
                    return Err(name_taken(&input.name));
                }
            }
            let product = input.into_product(existing.id);
            tx.update_product(product.clone())?;
            Ok(product)
        })
    }

    /// Delete a product and every stock link to it.
    #[tracing::instrument(skip(self))]
    pub fn delete_product(&self, name: &str) -> Result<(), InventoryError> {
        self.store.transaction(|tx| {
            let product = load_product(&*tx, name)?;
            tx.delete_product(product.id)?;
            Ok(())
        })
    }

    // Links

    /// Stock levels of an inventory, joined with their products, by product name.
    pub fn list_inventory_products(
        &self,
        inventory_id: Uuid,
        caller: &str,
    ) -> Result<Vec<InventoryProductView>, InventoryError> {
        self.store.read(|r| {
            load_for_member(r, inventory_id, caller)?;

            let links = r.list_links(inventory_id)?;
            let ids: Vec<Uuid> = links.iter().map(|l| l.product_id).collect();
            let products = r.list_products_by_ids(&ids)?;

            let mut views: Vec<InventoryProductView> = links
                .iter()
                .filter_map(|link| {
                    products
                        .iter()
                        .find(|p| p.id == link.product_id)
                        .map(|p| InventoryProductView::new(link, p))
                })
                .collect();
            views.sort_by(|a, b| a.product_name.cmp(&b.product_name));
            Ok(views)
        })
    }

    /// Start tracking a product (by name) in an inventory.
    #[tracing::instrument(skip(self, input), fields(product = %input.product_name))]
    pub fn add_inventory_product(
        &self,
        inventory_id: Uuid,
        input: NewInventoryProduct,
        caller: &str,
    ) -> Result<InventoryProductView, InventoryError> {
        input.amounts().validate()?;

        self.store.transaction(|tx| {
            load_for_member(&*tx, inventory_id, caller)?;
            let product = load_product(&*tx, &input.product_name)?;
            if tx.product_link_exists(inventory_id, product.id)? {
                return Err(InventoryError::conflict(format!(
                    "{} is already tracked in inventory {}",
                    product.name, inventory_id
                )));
            }

            let link = input.amounts().into_link(inventory_id, product.id);
            tx.insert_link(link.clone())?;
            Ok(InventoryProductView::new(&link, &product))
        })
    }

    #[tracing::instrument(skip(self, amounts))]
    pub fn update_inventory_product(
        &self,
        inventory_id: Uuid,
        product_id: Uuid,
        amounts: LinkAmounts,
        caller: &str,
    ) -> Result<InventoryProduct, InventoryError> {
        amounts.validate()?;

        self.store.transaction(|tx| {
            load_for_member(&*tx, inventory_id, caller)?;
            if tx.get_link(inventory_id, product_id)?.is_none() {
                return Err(link_not_found(inventory_id, &product_id.to_string()));
            }
            let link = amounts.into_link(inventory_id, product_id);
            tx.update_link(link.clone())?;
            Ok(link)
        })
    }

    /// Stop tracking a product (by name) in an inventory.
    #[tracing::instrument(skip(self))]
    pub fn remove_inventory_product(
        &self,
        inventory_id: Uuid,
        product_name: &str,
        caller: &str,
    ) -> Result<(), InventoryError> {
        self.store.transaction(|tx| {
            load_for_member(&*tx, inventory_id, caller)?;
            let product = load_product(&*tx, product_name)?;
            if tx.delete_product_links(inventory_id, &[product.id])? == 0 {
                return Err(link_not_found(inventory_id, product_name));
            }
            Ok(())
        })
    }
}

fn load_product<R: StoreRead + ?Sized>(store: &R, name: &str) -> Result<Product, InventoryError> {
    store
        .get_product_by_name(name)?
        .ok_or_else(|| InventoryError::not_found(format!("product {}", name)))
}

fn name_taken(name: &str) -> InventoryError {
    InventoryError::conflict(format!("a product named {} already exists", name))
}

fn link_not_found(inventory_id: Uuid, product: &str) -> InventoryError {
    InventoryError::not_found(format!(
        "product {} in inventory {}",
        product, inventory_id
    ))
}

fn required_name<'a>(name: &'a str, what: &str) -> Result<&'a str, InventoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InventoryError::validation(format!("{} is required", what)));
    }
    Ok(name)
}
