use std::fmt;

use crate::store::StoreError;

/// Error returned by membership and catalog operations.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryError {
    /// No verified caller identity.
    Unauthorized,
    /// A required field is missing or out of range.
    Validation(String),
    /// A referenced inventory, product, member or link does not exist.
    NotFound(String),
    /// The caller may not perform this operation.
    Forbidden(String),
    /// The row already exists.
    Conflict(String),
    /// A consistency rule would be broken by committing.
    Invariant(String),
    /// Persistence failure.
    Store(StoreError),
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryError::Unauthorized => write!(f, "unauthorized"),
            InventoryError::Validation(msg) => write!(f, "invalid request: {}", msg),
            InventoryError::NotFound(what) => write!(f, "not found: {}", what),
            InventoryError::Forbidden(msg) => write!(f, "forbidden: {}", msg),
            InventoryError::Conflict(msg) => write!(f, "conflict: {}", msg),
            InventoryError::Invariant(msg) => write!(f, "invariant violated: {}", msg),
            InventoryError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for InventoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InventoryError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for InventoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { table, key } => {
                InventoryError::Conflict(format!("{} already contains {}", table, key))
            }
            other => InventoryError::Store(other),
        }
    }
}

impl InventoryError {
    /// Map this error to an HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            InventoryError::Unauthorized => 401,
            InventoryError::Validation(_) => 400,
            InventoryError::NotFound(_) => 404,
            InventoryError::Forbidden(_) => 403,
            InventoryError::Conflict(_) => 409,
            InventoryError::Invariant(_) => 500,
            InventoryError::Store(_) => 500,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        InventoryError::Validation(msg.into())
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        InventoryError::NotFound(what.into())
    }

    pub(crate) fn forbidden(msg: impl Into<String>) -> Self {
        InventoryError::Forbidden(msg.into())
    }

    pub(crate) fn conflict(msg: impl Into<String>) -> Self {
        InventoryError::Conflict(msg.into())
    }
}
