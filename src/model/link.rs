use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PackageUnit, Product};
use crate::record::Record;

/// Stock levels of one product inside one inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
#[record(table = "inventory_products")]
pub struct InventoryProduct {
    #[record(key)]
    pub inventory_id: Uuid,
    #[record(key)]
    pub product_id: Uuid,
    pub existing_amount: f64,
    pub desired_amount: f64,
}

/// A link joined with its product, as listed for an inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryProductView {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_price: f64,
    pub unit: PackageUnit,
    pub existing_amount: f64,
    pub desired_amount: f64,
}

impl InventoryProductView {
    pub fn new(link: &InventoryProduct, product: &Product) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            product_price: product.supposed_price,
            unit: product.unit,
            existing_amount: link.existing_amount,
            desired_amount: link.desired_amount,
        }
    }
}
