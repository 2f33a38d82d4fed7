//! redb-based key-value storage for portal collections
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `collections` | collection name | JSON document | One whole collection per key |
//!
//! Collections are read and written wholesale: the engines read the full
//! list, mutate it in memory and write the full list back. Each `set` is its
//! own write transaction.

use redb::{Database, ReadableDatabase, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for storing collections: key = collection name, value = JSON document
const COLLECTIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("collections");

/// Named collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Employees,
    Attendance,
    LeaveRequests,
    /// Single record, not a list
    CurrentSession,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Employees,
        Collection::Attendance,
        Collection::LeaveRequests,
        Collection::CurrentSession,
    ];

    /// Storage key (also used as the notification resource name)
    pub fn key(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Employees => "employees",
            Self::Attendance => "attendance",
            Self::LeaveRequests => "leaveRequests",
            Self::CurrentSession => "currentSession",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to create storage directory: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Stored bytes exist but do not decode into the expected shape
    pub fn is_corruption(&self) -> bool {
        matches!(self, StorageError::Serialization(_))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Collection storage backed by redb
#[derive(Clone)]
pub struct PulseStorage {
    db: Arc<Database>,
}

impl fmt::Debug for PulseStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PulseStorage").finish_non_exhaustive()
    }
}

impl PulseStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate`, so a `set` that returned
    /// `Ok` is on disk.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and ephemeral sessions)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(COLLECTIONS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Read a collection; `None` before its first write
    pub fn get<T: DeserializeOwned>(&self, collection: Collection) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COLLECTIONS_TABLE)?;

        match table.get(collection.key())? {
            Some(value) => {
                let doc: T = serde_json::from_slice(value.value())?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    /// Replace a collection
    pub fn set<T: Serialize + ?Sized>(&self, collection: Collection, value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(COLLECTIONS_TABLE)?;
            table.insert(collection.key(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Remove a collection; returns whether it existed
    pub fn remove(&self, collection: Collection) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut table = txn.open_table(COLLECTIONS_TABLE)?;
            table.remove(collection.key())?.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }

    /// Whether the collection has ever been written
    pub fn contains(&self, collection: Collection) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COLLECTIONS_TABLE)?;
        Ok(table.get(collection.key())?.is_some())
    }

    /// Write raw bytes under a collection key (for corruption tests)
    #[cfg(test)]
    pub(crate) fn set_raw(&self, collection: Collection, bytes: &[u8]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(COLLECTIONS_TABLE)?;
            table.insert(collection.key(), bytes)?;
        }
        txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_before_first_write_is_none() {
        let storage = PulseStorage::open_in_memory().unwrap();
        let value: Option<Vec<String>> = storage.get(Collection::Employees).unwrap();
        assert!(value.is_none());
        assert!(!storage.contains(Collection::Employees).unwrap());
    }

    #[test]
    fn test_set_replaces_whole_collection() {
        let storage = PulseStorage::open_in_memory().unwrap();
        storage
            .set(Collection::Attendance, &vec!["a".to_string(), "b".to_string()])
            .unwrap();
        storage.set(Collection::Attendance, &vec!["c".to_string()]).unwrap();

        let value: Vec<String> = storage.get(Collection::Attendance).unwrap().unwrap();
        assert_eq!(value, vec!["c".to_string()]);
    }

    #[test]
    fn test_collections_are_independent() {
        let storage = PulseStorage::open_in_memory().unwrap();
        storage.set(Collection::Users, &vec![1, 2]).unwrap();
        storage.set(Collection::LeaveRequests, &vec![3]).unwrap();

        assert!(storage.remove(Collection::Users).unwrap());
        assert!(!storage.remove(Collection::Users).unwrap());
        let leave: Vec<i32> = storage.get(Collection::LeaveRequests).unwrap().unwrap();
        assert_eq!(leave, vec![3]);
    }

    #[test]
    fn test_corrupted_document_is_reported() {
        let storage = PulseStorage::open_in_memory().unwrap();
        storage.set_raw(Collection::Employees, b"{not json").unwrap();

        let err = storage.get::<Vec<i32>>(Collection::Employees).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_file_backed_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pulse.redb");
        {
            let storage = PulseStorage::open(&path).unwrap();
            storage.set(Collection::Employees, &vec!["EMP001"]).unwrap();
        }
        let storage = PulseStorage::open(&path).unwrap();
        let value: Vec<String> = storage.get(Collection::Employees).unwrap().unwrap();
        assert_eq!(value, vec!["EMP001".to_string()]);
    }
}
