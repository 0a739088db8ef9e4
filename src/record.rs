//! Records - typed rows and the keyed tables that hold them.
//!
//! A `Record` is a plain struct with a table name and a primary key.
//! Implement it with `#[derive(Record)]`:
//!
//! ```ignore
//! use home_inventory::Record;
//!
//! #[derive(Clone, Record)]
//! #[record(table = "products")]
//! pub struct Product {
//!     pub id: Uuid,          // key by default
//!     pub name: String,
//! }
//!
//! let mut products = Table::<Product>::new();
//! products.insert(product)?;
//! ```

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use crate::store::StoreError;

pub use home_inventory_macros::Record;

/// Trait for types that can be stored as rows.
pub trait Record: Clone + Send + Sync + 'static {
    /// Primary key. Composite keys are tuples.
    type Key: Ord + Clone + fmt::Debug + Send + Sync;

    /// The table name for this record type (e.g., "inventories").
    const TABLE: &'static str;

    /// Returns the primary key of this row.
    fn key(&self) -> Self::Key;
}

/// An ordered, keyed collection of records of one type.
#[derive(Debug, Clone)]
pub struct Table<R: Record> {
    rows: BTreeMap<R::Key, R>,
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Table<R> {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &R::Key) -> Option<&R> {
        self.rows.get(key)
    }

    pub fn contains(&self, key: &R::Key) -> bool {
        self.rows.contains_key(key)
    }

    /// Insert a new row. Fails if a row with the same key exists.
    pub fn insert(&mut self, row: R) -> Result<(), StoreError> {
        match self.rows.entry(row.key()) {
            btree_map::Entry::Occupied(entry) => Err(StoreError::Duplicate {
                table: R::TABLE,
                key: format!("{:?}", entry.key()),
            }),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(row);
                Ok(())
            }
        }
    }

    /// Replace an existing row and hand back the previous one. Returns `None`
    /// (and stores nothing) if there was nothing to replace.
    ///
    /// The row's key must not change; use `remove` + `insert` for that.
    pub fn replace(&mut self, row: R) -> Option<R> {
        self.rows
            .get_mut(&row.key())
            .map(|existing| std::mem::replace(existing, row))
    }

    /// Delete a row by key. Returns the removed row if it existed.
    pub fn remove(&mut self, key: &R::Key) -> Option<R> {
        self.rows.remove(key)
    }

    /// Delete every row matching the predicate and return them in key order.
    pub fn take_where(&mut self, predicate: impl Fn(&R) -> bool) -> Vec<R> {
        let keys: Vec<R::Key> = self
            .rows
            .iter()
            .filter(|(_, row)| predicate(row))
            .map(|(key, _)| key.clone())
            .collect();
        keys.iter().filter_map(|key| self.rows.remove(key)).collect()
    }

    /// Put a key back to an earlier state: the given row, or absent.
    pub fn restore(&mut self, key: R::Key, previous: Option<R>) {
        match previous {
            Some(row) => {
                self.rows.insert(key, row);
            }
            None => {
                self.rows.remove(&key);
            }
        }
    }

    /// Rows matching the predicate, in key order.
    pub fn filter<'a>(&'a self, predicate: impl Fn(&R) -> bool + 'a) -> impl Iterator<Item = &'a R> {
        self.rows.values().filter(move |row| predicate(row))
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
