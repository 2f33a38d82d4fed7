//! Repository Module
//!
//! One [`Repository`] per collection, injected into the engines. Every call
//! goes to storage; nothing is cached, so two readers never see stale data.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use super::storage::{Collection, PulseStorage, StorageError};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Failed to read {collection}: {source}")]
    Read {
        collection: Collection,
        source: StorageError,
    },

    #[error("Stored {collection} data is corrupted: {source}")]
    Corrupted {
        collection: Collection,
        source: StorageError,
    },

    #[error("Failed to write {collection}: {source}")]
    Write {
        collection: Collection,
        source: StorageError,
    },
}

impl RepoError {
    pub fn collection(&self) -> Collection {
        match self {
            RepoError::Read { collection, .. }
            | RepoError::Corrupted { collection, .. }
            | RepoError::Write { collection, .. } => *collection,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RepoError::Read { .. } => ErrorCode::StorageReadFailed,
            RepoError::Corrupted { .. } => ErrorCode::StorageCorrupted,
            RepoError::Write { .. } => ErrorCode::StorageWriteFailed,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        tracing::error!(collection = %err.collection(), error = %err, "Storage failure");
        AppError::new(err.code()).with_detail("collection", err.collection().key())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Whole-collection access
pub trait Repository<T>: Send + Sync {
    fn collection(&self) -> Collection;

    /// Read the full collection
    fn list(&self) -> RepoResult<Vec<T>>;

    /// Replace the full collection
    fn replace(&self, items: &[T]) -> RepoResult<()>;
}

/// Sample data generator used on first access
pub type SeedFn<T> = Arc<dyn Fn() -> Vec<T> + Send + Sync>;

/// [`Repository`] over one redb collection
pub struct CollectionRepository<T> {
    storage: PulseStorage,
    collection: Collection,
    seed: Option<SeedFn<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CollectionRepository<T> {
    pub fn new(storage: PulseStorage, collection: Collection) -> Self {
        Self {
            storage,
            collection,
            seed: None,
            _marker: PhantomData,
        }
    }

    /// Seed the collection when it is read before its first write
    pub fn with_seed(mut self, seed: SeedFn<T>) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl<T> Repository<T> for CollectionRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    fn collection(&self) -> Collection {
        self.collection
    }

    fn list(&self) -> RepoResult<Vec<T>> {
        let collection = self.collection;
        match self.storage.get::<Vec<T>>(collection) {
            Ok(Some(items)) => Ok(items),
            Ok(None) => {
                let Some(seed) = &self.seed else {
                    return Ok(Vec::new());
                };
                let items = seed();
                self.replace(&items)?;
                tracing::info!(%collection, count = items.len(), "Seeded sample data");
                Ok(items)
            }
            Err(source) if source.is_corruption() => Err(RepoError::Corrupted { collection, source }),
            Err(source) => Err(RepoError::Read { collection, source }),
        }
    }

    fn replace(&self, items: &[T]) -> RepoResult<()> {
        self.storage
            .set(self.collection, items)
            .map_err(|source| RepoError::Write {
                collection: self.collection,
                source,
            })
    }
}
