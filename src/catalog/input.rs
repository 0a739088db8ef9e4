use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InventoryError;
use crate::model::{InventoryProduct, PackageUnit, Product};

/// New name and description for an inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields of a product, for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub supposed_price: f64,
    #[serde(default)]
    pub unit: PackageUnit,
}

impl ProductInput {
    /// Trim the name and reject blank names or bad prices.
    pub(crate) fn validated(mut self) -> Result<Self, InventoryError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(InventoryError::validation("product name is required"));
        }
        if !self.supposed_price.is_finite() || self.supposed_price < 0.0 {
            return Err(InventoryError::validation(
                "price must be a non-negative number",
            ));
        }
        Ok(self)
    }

    pub(crate) fn into_product(self, id: Uuid) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            supposed_price: self.supposed_price,
            unit: self.unit,
        }
    }
}

/// Current and wanted stock of a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAmounts {
    pub existing_amount: f64,
    pub desired_amount: f64,
}

impl LinkAmounts {
    pub(crate) fn validate(&self) -> Result<(), InventoryError> {
        for (field, value) in [
            ("existingAmount", self.existing_amount),
            ("desiredAmount", self.desired_amount),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InventoryError::validation(format!(
                    "{} must be a non-negative number",
                    field
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn into_link(self, inventory_id: Uuid, product_id: Uuid) -> InventoryProduct {
        InventoryProduct {
            inventory_id,
            product_id,
            existing_amount: self.existing_amount,
            desired_amount: self.desired_amount,
        }
    }
}

/// Start tracking the product called `product_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryProduct {
    pub product_name: String,
    #[serde(default)]
    pub existing_amount: f64,
    #[serde(default)]
    pub desired_amount: f64,
}

impl NewInventoryProduct {
    pub fn amounts(&self) -> LinkAmounts {
        LinkAmounts {
            existing_amount: self.existing_amount,
            desired_amount: self.desired_amount,
        }
    }
}
