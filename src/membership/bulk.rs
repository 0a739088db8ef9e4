use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{InventoryProduct, Product};

/// Outcome of a bulk product removal.
///
/// `missing_ids` are requested ids with no product at all. `not_linked_names`
/// name the requested products that exist but were not linked to the
/// inventory. Both keep request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRemovalReport {
    pub deleted_count: usize,
    pub missing_ids: Vec<Uuid>,
    pub not_linked_names: Vec<String>,
}

impl BulkRemovalReport {
    /// Classify `requested` against the products that exist and the links
    /// the inventory has. `deleted_count` is what the delete actually removed.
    pub fn reconcile(
        requested: &[Uuid],
        found: &[Product],
        linked: &[InventoryProduct],
        deleted_count: usize,
    ) -> Self {
        let names: HashMap<Uuid, &str> = found.iter().map(|p| (p.id, p.name.as_str())).collect();
        let linked: HashSet<Uuid> = linked.iter().map(|l| l.product_id).collect();

        let missing_ids = requested
            .iter()
            .filter(|id| !names.contains_key(*id))
            .copied()
            .collect();
        let not_linked_names = requested
            .iter()
            .filter(|id| !linked.contains(*id))
            .filter_map(|id| names.get(id).map(|name| name.to_string()))
            .collect();

        Self {
            deleted_count,
            missing_ids,
            not_linked_names,
        }
    }
}

/// Drop repeated ids, keeping the first occurrence of each.
pub(crate) fn dedup_preserving_order(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
