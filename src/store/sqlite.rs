//! SqliteStore - durable store on a single SQLite database.
//!
//! The schema is created on open. Members and links reference their
//! inventory (and links their product) with `ON DELETE CASCADE`, so deletes
//! cascade inside the database rather than in code.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{ffi, params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use uuid::Uuid;

use super::{InventoryStore, StoreError, StoreRead, StoreWrite};
use crate::model::{Inventory, InventoryMember, InventoryProduct, PackageUnit, Product};
use crate::record::Record;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS inventories (
      id BLOB PRIMARY KEY,
      name TEXT NOT NULL,
      description TEXT,
      owner TEXT NOT NULL,
      created_at TEXT NOT NULL,
      last_modified_at TEXT NOT NULL
    ) WITHOUT ROWID;
    CREATE TABLE IF NOT EXISTS inventory_members (
      inventory_id BLOB NOT NULL REFERENCES inventories(id) ON DELETE CASCADE,
      user_key TEXT NOT NULL,
      user_id TEXT NOT NULL,
      member_since TEXT NOT NULL,
      PRIMARY KEY (inventory_id, user_key)
    ) WITHOUT ROWID;
    CREATE INDEX IF NOT EXISTS inventory_members_user ON inventory_members(user_key);
    CREATE TABLE IF NOT EXISTS products (
      id BLOB PRIMARY KEY,
      name TEXT NOT NULL UNIQUE,
      description TEXT,
      supposed_price REAL NOT NULL,
      unit TEXT NOT NULL
    ) WITHOUT ROWID;
    CREATE TABLE IF NOT EXISTS inventory_products (
      inventory_id BLOB NOT NULL REFERENCES inventories(id) ON DELETE CASCADE,
      product_id BLOB NOT NULL REFERENCES products(id) ON DELETE CASCADE,
      existing_amount REAL NOT NULL,
      desired_amount REAL NOT NULL,
      PRIMARY KEY (inventory_id, product_id)
    ) WITHOUT ROWID;
    CREATE INDEX IF NOT EXISTS inventory_products_product ON inventory_products(product_id);
";

const INVENTORY_COLUMNS: &str = "id, name, description, owner, created_at, last_modified_at";
const PRODUCT_COLUMNS: &str = "id, name, description, supposed_price, unit";
const LINK_COLUMNS: &str = "inventory_id, product_id, existing_amount, desired_amount";

/// Store on one SQLite connection. Clones share the connection.
///
/// Reads and transactions take the connection lock for their whole run, so
/// transactions never interleave. A transaction commits only when its closure
/// returns `Ok`.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(storage)?;
        tracing::info!(path = %path.display(), "opened sqlite store");
        Self::init(conn)
    }

    /// A private database that lives as long as the store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory().map_err(storage)?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(storage)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl InventoryStore for SqliteStore {
    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreRead) -> Result<T, E>,
        E: From<StoreError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        f(&Tables { conn: &*conn })
    }

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreWrite) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned("transaction"))?;
        let tx = conn.transaction().map_err(storage)?;

        let result = f(&mut Tables { conn: &*tx });
        match result {
            Ok(value) => {
                tx.commit().map_err(storage)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    tracing::warn!(error = %rollback, "sqlite rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// The tables as seen through one connection or open transaction.
struct Tables<'c> {
    conn: &'c Connection,
}

impl Tables<'_> {
    fn query_all<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, StoreError> {
        let mut stmt = self.conn.prepare_cached(sql).map_err(storage)?;
        let rows = stmt.query_map(params, map).map_err(storage)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(storage)
    }

    fn query_one<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>, StoreError> {
        self.conn
            .query_row(sql, params, map)
            .optional()
            .map_err(storage)
    }

    fn exists(&self, sql: &str, params: impl rusqlite::Params) -> Result<bool, StoreError> {
        self.conn
            .query_row(sql, params, |row| row.get(0))
            .map_err(storage)
    }
}

impl StoreRead for Tables<'_> {
    fn get_inventory(&self, id: Uuid) -> Result<Option<Inventory>, StoreError> {
        self.query_one(
            &format!("SELECT {INVENTORY_COLUMNS} FROM inventories WHERE id = ?1"),
            params![id],
            inventory_row,
        )
    }

    fn list_inventories_for_member(&self, user_id: &str) -> Result<Vec<Inventory>, StoreError> {
        self.query_all(
            "SELECT i.id, i.name, i.description, i.owner, i.created_at, i.last_modified_at
             FROM inventories i
             JOIN inventory_members m ON m.inventory_id = i.id
             WHERE m.user_key = ?1
             ORDER BY i.id",
            params![user_key(user_id)],
            inventory_row,
        )
    }

    fn list_members(&self, inventory_id: Uuid) -> Result<Vec<InventoryMember>, StoreError> {
        self.query_all(
            "SELECT inventory_id, user_id, member_since FROM inventory_members
             WHERE inventory_id = ?1 ORDER BY user_key",
            params![inventory_id],
            member_row,
        )
    }

    fn member_exists(&self, inventory_id: Uuid, user_id: &str) -> Result<bool, StoreError> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM inventory_members WHERE inventory_id = ?1 AND user_key = ?2)",
            params![inventory_id, user_key(user_id)],
        )
    }

    fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        self.query_one(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
            params![id],
            product_row,
        )
    }

    fn get_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        self.query_one(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?1"),
            params![name],
            product_row,
        )
    }

    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.query_all(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"),
            params![],
            product_row,
        )
    }

    fn list_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.query_all(
            &format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ({}) ORDER BY id",
                placeholders(1, ids.len())
            ),
            params_from_iter(ids),
            product_row,
        )
    }

    fn get_link(
        &self,
        inventory_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<InventoryProduct>, StoreError> {
        self.query_one(
            &format!(
                "SELECT {LINK_COLUMNS} FROM inventory_products
                 WHERE inventory_id = ?1 AND product_id = ?2"
            ),
            params![inventory_id, product_id],
            link_row,
        )
    }

    fn product_link_exists(&self, inventory_id: Uuid, product_id: Uuid) -> Result<bool, StoreError> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM inventory_products WHERE inventory_id = ?1 AND product_id = ?2)",
            params![inventory_id, product_id],
        )
    }

    fn list_links(&self, inventory_id: Uuid) -> Result<Vec<InventoryProduct>, StoreError> {
        self.query_all(
            &format!(
                "SELECT {LINK_COLUMNS} FROM inventory_products
                 WHERE inventory_id = ?1 ORDER BY product_id"
            ),
            params![inventory_id],
            link_row,
        )
    }

    fn list_links_for_products(
        &self,
        inventory_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<InventoryProduct>, StoreError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.query_all(
            &format!(
                "SELECT {LINK_COLUMNS} FROM inventory_products
                 WHERE inventory_id = ?1 AND product_id IN ({}) ORDER BY product_id",
                placeholders(2, product_ids.len())
            ),
            params_from_iter(std::iter::once(&inventory_id).chain(product_ids)),
            link_row,
        )
    }
}

impl StoreWrite for Tables<'_> {
    fn insert_inventory(&mut self, inventory: Inventory) -> Result<(), StoreError> {
        self.conn
            .execute(
                &format!("INSERT INTO inventories ({INVENTORY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    inventory.id,
                    inventory.name,
                    inventory.description,
                    inventory.owner,
                    inventory.created_at,
                    inventory.last_modified_at
                ],
            )
            .map_err(write_failed(&inventory))?;
        Ok(())
    }

    fn update_inventory(&mut self, inventory: Inventory) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute(
                "UPDATE inventories
                 SET name = ?2, description = ?3, owner = ?4, created_at = ?5, last_modified_at = ?6
                 WHERE id = ?1",
                params![
                    inventory.id,
                    inventory.name,
                    inventory.description,
                    inventory.owner,
                    inventory.created_at,
                    inventory.last_modified_at
                ],
            )
            .map_err(storage)?;
        Ok(changed > 0)
    }

    fn set_inventory_owner(
        &mut self,
        id: Uuid,
        new_owner: &str,
        modified_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute(
                "UPDATE inventories SET owner = ?2, last_modified_at = ?3 WHERE id = ?1",
                params![id, new_owner, modified_at],
            )
            .map_err(storage)?;
        Ok(changed > 0)
    }

    fn delete_inventory(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM inventories WHERE id = ?1", params![id])
            .map_err(storage)?;
        Ok(deleted > 0)
    }

    fn insert_member(&mut self, member: InventoryMember) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO inventory_members (inventory_id, user_key, user_id, member_since)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    member.inventory_id,
                    user_key(&member.user_id),
                    member.user_id,
                    member.member_since
                ],
            )
            .map_err(write_failed(&member))?;
        Ok(())
    }

    fn delete_member(&mut self, inventory_id: Uuid, user_id: &str) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM inventory_members WHERE inventory_id = ?1 AND user_key = ?2",
                params![inventory_id, user_key(user_id)],
            )
            .map_err(storage)?;
        Ok(deleted > 0)
    }

    fn insert_product(&mut self, product: Product) -> Result<(), StoreError> {
        self.conn
            .execute(
                &format!("INSERT INTO products ({PRODUCT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                params![
                    product.id,
                    product.name,
                    product.description,
                    product.supposed_price,
                    product.unit
                ],
            )
            .map_err(write_failed(&product))?;
        Ok(())
    }

    fn update_product(&mut self, product: Product) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute(
                "UPDATE products SET name = ?2, description = ?3, supposed_price = ?4, unit = ?5
                 WHERE id = ?1",
                params![
                    product.id,
                    product.name,
                    product.description,
                    product.supposed_price,
                    product.unit
                ],
            )
            .map_err(write_failed(&product))?;
        Ok(changed > 0)
    }

    fn delete_product(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])
            .map_err(storage)?;
        Ok(deleted > 0)
    }

    fn insert_link(&mut self, link: InventoryProduct) -> Result<(), StoreError> {
        self.conn
            .execute(
                &format!("INSERT INTO inventory_products ({LINK_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
                params![
                    link.inventory_id,
                    link.product_id,
                    link.existing_amount,
                    link.desired_amount
                ],
            )
            .map_err(write_failed(&link))?;
        Ok(())
    }

    fn update_link(&mut self, link: InventoryProduct) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute(
                "UPDATE inventory_products SET existing_amount = ?3, desired_amount = ?4
                 WHERE inventory_id = ?1 AND product_id = ?2",
                params![
                    link.inventory_id,
                    link.product_id,
                    link.existing_amount,
                    link.desired_amount
                ],
            )
            .map_err(storage)?;
        Ok(changed > 0)
    }

    fn delete_product_links(
        &mut self,
        inventory_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<usize, StoreError> {
        if product_ids.is_empty() {
            return Ok(0);
        }
        self.conn
            .execute(
                &format!(
                    "DELETE FROM inventory_products WHERE inventory_id = ?1 AND product_id IN ({})",
                    placeholders(2, product_ids.len())
                ),
                params_from_iter(std::iter::once(&inventory_id).chain(product_ids)),
            )
            .map_err(storage)
    }
}

fn inventory_row(row: &Row<'_>) -> rusqlite::Result<Inventory> {
    Ok(Inventory {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        owner: row.get(3)?,
        created_at: row.get(4)?,
        last_modified_at: row.get(5)?,
    })
}

fn member_row(row: &Row<'_>) -> rusqlite::Result<InventoryMember> {
    Ok(InventoryMember {
        inventory_id: row.get(0)?,
        user_id: row.get(1)?,
        member_since: row.get(2)?,
    })
}

fn product_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        supposed_price: row.get(3)?,
        unit: row.get(4)?,
    })
}

fn link_row(row: &Row<'_>) -> rusqlite::Result<InventoryProduct> {
    Ok(InventoryProduct {
        inventory_id: row.get(0)?,
        product_id: row.get(1)?,
        existing_amount: row.get(2)?,
        desired_amount: row.get(3)?,
    })
}

impl ToSql for PackageUnit {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let name = match self {
            PackageUnit::Piece => "Piece",
            PackageUnit::Pack => "Pack",
            PackageUnit::Gram => "Gram",
            PackageUnit::Kilogram => "Kilogram",
            PackageUnit::Milliliter => "Milliliter",
            PackageUnit::Liter => "Liter",
        };
        Ok(ToSqlOutput::from(name))
    }
}

impl FromSql for PackageUnit {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "Piece" => Ok(PackageUnit::Piece),
            "Pack" => Ok(PackageUnit::Pack),
            "Gram" => Ok(PackageUnit::Gram),
            "Kilogram" => Ok(PackageUnit::Kilogram),
            "Milliliter" => Ok(PackageUnit::Milliliter),
            "Liter" => Ok(PackageUnit::Liter),
            other => Err(FromSqlError::Other(
                format!("unknown package unit {}", other).into(),
            )),
        }
    }
}

/// Folded member key, matching the in-memory table's `fold_case` key.
fn user_key(user_id: &str) -> String {
    user_id.to_lowercase()
}

/// `?first, ?first+1, ...` for `count` parameters.
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|n| format!("?{}", n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn storage(err: rusqlite::Error) -> StoreError {
    StoreError::Storage(err.to_string())
}

/// Key conflicts become `Duplicate` on the row's table; anything else,
/// including a dangling foreign key, is a storage error.
fn write_failed<R: Record>(row: &R) -> impl FnOnce(rusqlite::Error) -> StoreError {
    let key = row.key();
    move |err| {
        let conflict = matches!(
            &err,
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
        );
        if conflict {
            StoreError::Duplicate {
                table: R::TABLE,
                key: format!("{:?}", key),
            }
        } else {
            storage(err)
        }
    }
}
