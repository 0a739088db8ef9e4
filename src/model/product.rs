use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::Record;

/// Package unit a product is counted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageUnit {
    #[default]
    Piece,
    Pack,
    Gram,
    Kilogram,
    Milliliter,
    Liter,
}

/// A product in the global catalog. Names are unique (case-sensitive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
#[record(table = "products")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub supposed_price: f64,
    #[serde(default)]
    pub unit: PackageUnit,
}
