//! Database Module
//!
//! redb key-value storage, the per-collection repositories built on it and
//! the sample data written on first access.

pub mod repository;
pub mod seed;
pub mod storage;

pub use repository::{CollectionRepository, RepoError, RepoResult, Repository};
pub use storage::{Collection, PulseStorage, StorageError, StorageResult};
