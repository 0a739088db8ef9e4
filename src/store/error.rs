use std::fmt;

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store lock was poisoned (a thread panicked while holding it).
    LockPoisoned(&'static str),
    /// A row with the same primary key already exists.
    Duplicate { table: &'static str, key: String },
    /// Any other storage-level failure.
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::Duplicate { table, key } => {
                write!(f, "duplicate key {} in {}", key, table)
            }
            StoreError::Storage(message) => write!(f, "storage error: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}
