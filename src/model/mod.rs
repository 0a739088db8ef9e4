//! Domain rows stored by the inventory store.
//!
//! - [`Inventory`] and its [`InventoryMember`] rows (owner + members)
//! - [`Product`], the global product catalog
//! - [`InventoryProduct`], the link carrying stock levels of a product in an inventory
//!
//! All rows serialize with camelCase field names.

mod inventory;
mod link;
mod product;

pub use inventory::{Inventory, InventoryMember};
pub use link::{InventoryProduct, InventoryProductView};
pub use product::{PackageUnit, Product};
